use super::*;

#[test]
fn create_applies_defaults_and_overrides() {
    let mut scene = Scene::new();
    let e = scene
        .create(
            EntityKind::Shape2D,
            [("opacity".to_owned(), PropertyValue::Number(0.0))],
            None,
        )
        .unwrap();
    assert_eq!(e.id, EntityId(0));
    assert_eq!(e.properties["opacity"], PropertyValue::Number(0.0));
    assert!(e.properties.contains_key("rotation"));

    let bad = scene.create(
        EntityKind::Shape2D,
        [("opacity".to_owned(), PropertyValue::from("half"))],
        None,
    );
    assert!(matches!(bad, Err(WavyteError::Scene(_))));
}

#[test]
fn set_property_returns_old_value_and_checks_type() {
    let mut scene = Scene::new();
    let id = scene.create(EntityKind::Text2D, [], None).unwrap().id;

    let old = scene.set_property(id, "text", "hi".into()).unwrap();
    assert_eq!(old, PropertyValue::Text(String::new()));
    assert_eq!(scene.property(id, "text"), Some(&PropertyValue::from("hi")));

    assert!(scene.set_property(id, "text", 1.0.into()).is_err());
    assert!(scene.set_property(id, "undeclared", 1.0.into()).is_err());
    assert!(scene.set_property(EntityId(99), "text", "x".into()).is_err());
}

#[test]
fn batch_edit_is_all_or_nothing() {
    let mut scene = Scene::new();
    let a = scene.create(EntityKind::Shape2D, [], None).unwrap().id;
    let b = scene.create(EntityKind::Shape2D, [], None).unwrap().id;
    let cam = scene.create(EntityKind::Camera, [], None).unwrap().id;

    // The camera has no opacity, so nothing may change.
    assert!(
        scene
            .set_property_batch(&[a, b, cam], "opacity", &0.5.into())
            .is_err()
    );
    assert_eq!(scene.property(a, "opacity"), Some(&PropertyValue::Number(1.0)));

    scene.set_property(b, "opacity", 0.25.into()).unwrap();
    let old = scene
        .set_property_batch(&[a, b], "opacity", &0.5.into())
        .unwrap();
    assert_eq!(old, vec![PropertyValue::Number(1.0), PropertyValue::Number(0.25)]);

    assert!(scene.set_property_batch(&[a, a], "opacity", &0.5.into()).is_err());
}

#[test]
fn camera_rules() {
    let mut scene = Scene::new();
    let shape = scene.create(EntityKind::Shape2D, [], None).unwrap().id;
    let cam = scene.create(EntityKind::Camera, [], None).unwrap().id;

    assert!(scene.set_active_camera(Some(shape)).is_err());
    assert_eq!(scene.set_active_camera(Some(cam)).unwrap(), None);
    assert_eq!(scene.active_camera(), Some(cam));
    assert!(scene.destroy(cam).is_err());
    assert_eq!(scene.set_active_camera(None).unwrap(), Some(cam));
    assert!(scene.destroy(cam).is_ok());
}

#[test]
fn absorb_clamps_progress() {
    let mut scene = Scene::new();
    let id = scene.create(EntityKind::Mesh3D, [], None).unwrap().id;
    assert_eq!(scene.absorb(id, 1.5).unwrap(), 0.0);
    assert_eq!(scene.get(id).unwrap().absorb, 1.0);
    assert!(scene.absorb(id, f64::NAN).is_err());
}

#[test]
fn advance_expires_entities_in_id_order() {
    let mut scene = Scene::new();
    let a = scene.create(EntityKind::Shape2D, [], Some(1.0)).unwrap().id;
    let b = scene.create(EntityKind::Shape2D, [], Some(0.5)).unwrap().id;
    let keep = scene.create(EntityKind::Shape2D, [], None).unwrap().id;

    assert!(scene.advance(0.25).is_empty());
    let gone: Vec<_> = scene.advance(1.0).into_iter().map(|s| s.id).collect();
    assert_eq!(gone, vec![a, b]);
    assert_eq!(scene.entity_ids().collect::<Vec<_>>(), vec![keep]);
}

#[test]
fn render_buffers_get_sequential_ids() {
    let mut scene = Scene::new();
    assert_eq!(scene.allocate_render_buffer(64, 64).unwrap(), RenderBufferId(0));
    assert_eq!(scene.allocate_render_buffer(1, 1).unwrap(), RenderBufferId(1));
    assert!(scene.allocate_render_buffer(0, 64).is_err());
}

#[test]
fn reset_restarts_ids() {
    let mut scene = Scene::new();
    scene.create(EntityKind::Group, [], None).unwrap();
    scene.reset();
    assert!(scene.is_empty());
    assert_eq!(scene.create(EntityKind::Group, [], None).unwrap().id, EntityId(0));
}
