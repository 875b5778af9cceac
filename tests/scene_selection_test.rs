use scene_sandbox::scenes::{SceneKind, SceneSelector};
use winit::keyboard::KeyCode;

#[test]
fn every_scene_has_its_own_key() {
    for kind in SceneKind::ALL {
        assert_eq!(SceneKind::from_key(kind.key()), Some(kind));
    }
    assert_eq!(SceneKind::from_key(KeyCode::Digit1), Some(SceneKind::Shadow));
    assert_eq!(SceneKind::from_key(KeyCode::Digit4), Some(SceneKind::PostProcessing));
    // 5, 6 and 7 toggle lights
    assert_eq!(SceneKind::from_key(KeyCode::Digit5), None);
    assert_eq!(SceneKind::from_key(KeyCode::Digit7), None);
}

#[test]
fn scenes_parse_from_names_and_digits() {
    assert_eq!("perlin".parse::<SceneKind>(), Ok(SceneKind::Perlin));
    assert_eq!(" Stencil ".parse::<SceneKind>(), Ok(SceneKind::Stencil));
    assert_eq!("postprocessing".parse::<SceneKind>(), Ok(SceneKind::PostProcessing));
    assert_eq!("9".parse::<SceneKind>(), Ok(SceneKind::Particles));
    for kind in SceneKind::ALL {
        assert_eq!(kind.to_string().parse::<SceneKind>(), Ok(kind));
    }
    let err = "teapot".parse::<SceneKind>().unwrap_err();
    assert!(err.to_string().contains("teapot"));
}

#[test]
fn empty_selection_is_rejected() {
    assert!(SceneSelector::new(Vec::new(), SceneKind::Shadow).is_none());
}

#[test]
fn missing_start_scene_falls_back_to_the_first() {
    let selector = SceneSelector::new(vec![SceneKind::Perlin, SceneKind::Lod], SceneKind::Shadow)
        .expect("non-empty");
    assert_eq!(selector.active(), SceneKind::Perlin);
}

#[test]
fn next_and_prev_wrap_around() {
    let mut selector = SceneSelector::new(SceneKind::ALL.to_vec(), SceneKind::Stencil).expect("non-empty");
    assert_eq!(selector.active_index(), 6);
    assert_eq!(selector.next(), SceneKind::Shadow);
    assert_eq!(selector.prev(), SceneKind::Stencil);
    assert_eq!(selector.prev(), SceneKind::Particles);
    assert_eq!(selector.len(), 7);
}

#[test]
fn select_reports_changes_only() {
    let mut selector =
        SceneSelector::new(vec![SceneKind::Shadow, SceneKind::Deferred], SceneKind::Shadow).expect("non-empty");
    assert!(!selector.select(SceneKind::Shadow));
    assert!(selector.select(SceneKind::Deferred));
    assert_eq!(selector.active(), SceneKind::Deferred);
    assert!(!selector.select(SceneKind::Lod));
    assert_eq!(selector.active(), SceneKind::Deferred);
}
