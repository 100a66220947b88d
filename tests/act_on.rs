use lightdesk::image::ImageId;
use lightdesk::manager::{NullShell, SelectionStore, ViewManager};
use lightdesk::settings::Settings;

/// Selection double with a fixed selection and fixed groups.
struct FixedSelection {
    selected: Vec<ImageId>,
    groups: Vec<Vec<ImageId>>,
}

impl SelectionStore for FixedSelection {
    fn is_selected(&self, image: ImageId) -> bool {
        self.selected.contains(&image)
    }

    fn selected(&self) -> Vec<ImageId> {
        self.selected.clone()
    }

    fn group_members(&self, image: ImageId) -> Vec<ImageId> {
        self.groups
            .iter()
            .find(|g| g.contains(&image))
            .cloned()
            .unwrap_or_else(|| vec![image])
    }
}

fn manager(selected: Vec<ImageId>, groups: Vec<Vec<ImageId>>) -> ViewManager {
    ViewManager::new(
        Box::new(NullShell),
        Box::new(FixedSelection { selected, groups }),
        Settings::default(),
    )
}

#[test]
fn hover_on_a_selected_image_inside_the_table_acts_on_the_selection() {
    let mut vm = manager(vec![1, 2], vec![vec![2, 21, 22]]);
    vm.set_mouse_over(Some(2));
    vm.set_mouse_inside_table(true);
    assert_eq!(vm.images_to_act_on(false), [1, 2, 21, 22]);
}

#[test]
fn hover_outside_the_table_acts_on_the_hovered_image_only() {
    let mut vm = manager(vec![1, 2], vec![vec![2, 21, 22]]);
    vm.set_mouse_over(Some(2));
    vm.set_mouse_inside_table(false);
    // still expanded to its group, but the rest of the selection is ignored
    assert_eq!(vm.images_to_act_on(false), [2, 21, 22]);
}

#[test]
fn hover_on_an_unselected_image_acts_on_it_alone() {
    let mut vm = manager(vec![1, 2], Vec::new());
    vm.set_mouse_over(Some(5));
    vm.set_mouse_inside_table(true);
    assert_eq!(vm.images_to_act_on(false), [5]);
}

#[test]
fn without_hover_the_active_set_outranks_the_selection() {
    let mut vm = manager(vec![1], Vec::new());
    vm.active_images_add(7);
    vm.active_images_add(8);
    assert_eq!(vm.images_to_act_on(false), [7, 8]);

    vm.active_images_reset();
    assert_eq!(vm.images_to_act_on(false), [1]);
}

#[test]
fn only_visible_suppresses_group_expansion() {
    let mut vm = manager(vec![2], vec![vec![2, 21, 22]]);
    vm.set_mouse_over(Some(2));
    vm.set_mouse_inside_table(true);
    assert_eq!(vm.images_to_act_on(true), [2]);
}

#[test]
fn overlapping_groups_do_not_duplicate() {
    let mut vm = manager(vec![1, 2], vec![vec![1, 2, 3]]);
    vm.set_mouse_over(Some(1));
    vm.set_mouse_inside_table(true);
    assert_eq!(vm.images_to_act_on(false), [1, 2, 3]);
}

#[test]
fn single_image_resolution_ignores_hover_when_the_active_set_is_nonempty() {
    let mut vm = manager(vec![30], Vec::new());
    vm.set_mouse_over(Some(20));
    vm.active_images_add(10);
    assert_eq!(vm.image_to_act_on(), Some(10));
}

#[test]
fn grouping_disabled_means_no_expansion() {
    let mut settings = Settings::default();
    settings.grouping = false;
    let mut vm = ViewManager::new(
        Box::new(NullShell),
        Box::new(FixedSelection {
            selected: vec![2],
            groups: vec![vec![2, 21]],
        }),
        settings,
    );
    vm.set_mouse_over(Some(2));
    vm.set_mouse_inside_table(true);
    assert_eq!(vm.images_to_act_on(false), [2]);
}
