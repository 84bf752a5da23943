use std::{cell::Cell, rc::Rc, time::Duration};

use scene_experience::resources::{Asset, HdrImage, Resources, Source, SourceKind};

mod common;

use common::test_utils::{assets_root, poll_until_settled};

fn texture() -> Asset {
    Asset::Texture(image::DynamicImage::new_rgba8(1, 1))
}

fn count_ready(resources: &mut Resources) -> Rc<Cell<u32>> {
    let fired = Rc::new(Cell::new(0));
    let counter = fired.clone();
    resources.events.on(move |_| counter.set(counter.get() + 1));
    fired
}

#[test]
fn should_fire_ready_once_in_any_completion_order() {
    for order in [["a", "b", "c"], ["c", "a", "b"], ["b", "c", "a"]] {
        let sources = vec![
            Source::texture("a", "a.png"),
            Source::texture("b", "b.png"),
            Source::texture("c", "c.png"),
        ];
        let mut resources = Resources::new(sources, "assets").unwrap();
        let fired = count_ready(&mut resources);

        let made_ready: Vec<bool> = order
            .iter()
            .map(|name| resources.source_loaded(name, texture()))
            .collect();

        assert_eq!(made_ready, vec![false, false, true], "order {order:?}");
        assert_eq!(fired.get(), 1);
        assert!(resources.is_ready());
        assert!(resources.poll());
        assert!(!resources.poll());
    }
}

#[test]
fn should_ignore_repeated_and_unknown_completions() {
    let sources = vec![Source::texture("a", "a.png"), Source::texture("b", "b.png")];
    let mut resources = Resources::new(sources, "assets").unwrap();
    let fired = count_ready(&mut resources);

    assert!(!resources.source_loaded("a", texture()));
    assert!(!resources.source_loaded("a", texture()));
    assert!(!resources.source_loaded("nope", texture()));
    assert_eq!(resources.loaded, 1);
    assert!(!resources.is_ready());

    assert!(resources.source_loaded("b", texture()));
    assert!(!resources.source_loaded("b", texture()));
    assert_eq!(resources.loaded, 2);
    assert_eq!(fired.get(), 1);
}

#[test]
fn should_never_become_ready_after_a_failure() {
    let sources = vec![Source::texture("a", "a.png"), Source::texture("b", "b.png")];
    let mut resources = Resources::new(sources, "assets").unwrap();
    let fired = count_ready(&mut resources);

    resources.source_failed("a", &anyhow::anyhow!("404"));
    assert!(!resources.source_loaded("b", texture()));
    // a late success for a failed source still doesn't count
    assert!(!resources.source_loaded("a", texture()));

    assert_eq!(resources.failed, 1);
    assert_eq!(resources.loaded, 1);
    assert!(!resources.is_ready());
    assert!(!resources.poll());
    assert_eq!(fired.get(), 0);
}

#[test]
fn should_count_a_wrong_kind_of_asset_as_a_failure() {
    let sources = vec![Source::texture("a", "a.png"), Source::hdr("sky", "sky.hdr")];
    let mut resources = Resources::new(sources, "assets").unwrap();
    let fired = count_ready(&mut resources);

    assert!(!resources.source_loaded("sky", texture()));
    assert!(!resources.source_loaded("a", texture()));

    assert_eq!(resources.failed, 1);
    assert_eq!(resources.loaded, 1);
    assert!(resources.get("sky").is_none());
    assert!(!resources.is_ready());
    assert_eq!(fired.get(), 0);
}

#[test]
fn should_report_ready_for_an_empty_source_list() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut resources = Resources::new(Vec::new(), "assets").unwrap();
    let fired = count_ready(&mut resources);
    assert_eq!(resources.progress(), 1.0);

    resources.start_loading(&runtime);
    resources.start_loading(&runtime);

    assert_eq!(fired.get(), 1);
    assert!(resources.poll());
    assert!(!resources.poll());
}

#[test]
fn should_reject_invalid_source_lists() {
    let duplicate = vec![Source::texture("a", "a.png"), Source::hdr("a", "a.hdr")];
    assert!(Resources::new(duplicate, "assets").is_err());

    let short_cube = Source::new("sky", SourceKind::CubeTexture, &["px.png", "nx.png"]);
    assert!(short_cube.validate().is_err());
    assert!(Resources::new(vec![short_cube], "assets").is_err());
}

#[test]
fn should_load_every_demo_asset_from_disk() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let sources = vec![
        Source::gltf("drone", "models/drone/scene.gltf"),
        Source::texture("checker", "textures/checker.png"),
        Source::hdr("sky", "textures/sky.hdr"),
        Source::cube(
            "cube",
            [
                "textures/cube/px.png",
                "textures/cube/nx.png",
                "textures/cube/py.png",
                "textures/cube/ny.png",
                "textures/cube/pz.png",
                "textures/cube/nz.png",
            ],
        ),
    ];
    let mut resources = Resources::new(sources, assets_root()).unwrap();
    resources.start_loading(&runtime);

    let ready_reports = poll_until_settled(&mut resources, Duration::from_secs(10));

    assert_eq!(resources.failed, 0);
    assert_eq!(ready_reports, 1);
    assert_eq!(resources.loaded, 4);
    assert!(matches!(resources.get("checker"), Some(Asset::Texture(img)) if img.width() == 64));
    assert!(matches!(resources.get("cube"), Some(Asset::Cube(_))));
    match resources.get("sky") {
        Some(Asset::Hdr(HdrImage { width, height, pixels })) => {
            assert_eq!((*width, *height), (64, 32));
            // the sun is far brighter than anything an 8 bit texture can hold
            assert!(pixels.iter().any(|p| p[0] > 1.0));
        }
        other => panic!("expected an HDR image, got {other:?}"),
    }
}

#[test]
fn should_read_drone_texture_coordinates_inside_the_unit_square() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut resources = Resources::new(
        vec![Source::gltf("drone", "models/drone/scene.gltf")],
        assets_root(),
    )
    .unwrap();
    resources.start_loading(&runtime);
    poll_until_settled(&mut resources, Duration::from_secs(10));

    let drone = resources.gltf("drone").unwrap();
    let mut checked = 0;
    for mesh in drone.document.meshes() {
        for primitive in mesh.primitives() {
            let reader = primitive.reader(|buffer| drone.buffers.get(buffer.index()).map(Vec::as_slice));
            let coords = reader.read_tex_coords(0).unwrap().into_f32();
            for [u, v] in coords {
                assert!((0.0..=1.0).contains(&u) && (0.0..=1.0).contains(&v));
                checked += 1;
            }
        }
    }
    assert_eq!(checked, 5 * 24);
    assert!(resources.gltf("missing").is_err());
}

#[test]
fn should_fail_missing_files_without_becoming_ready() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut resources = Resources::new(
        vec![
            Source::texture("checker", "textures/checker.png"),
            Source::texture("ghost", "textures/does_not_exist.png"),
        ],
        assets_root(),
    )
    .unwrap();
    resources.start_loading(&runtime);

    let ready_reports = poll_until_settled(&mut resources, Duration::from_secs(10));

    assert_eq!(ready_reports, 0);
    assert_eq!(resources.loaded, 1);
    assert_eq!(resources.failed, 1);
    assert!(!resources.is_ready());
}
