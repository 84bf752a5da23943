#[cfg(feature = "integration-tests")]
mod common;

#[cfg(feature = "integration-tests")]
mod golden {
    use std::time::Duration;

    use scene_experience::{
        camera::CameraResources,
        data_structures::{
            geometry::Geometry,
            instance::Instance,
            material::{Material, ShaderMaterialDescriptor},
            render_target::RenderTarget,
        },
        experience::Experience,
        layers::{Layers, BLOOM_LAYER},
        postprocessing::{BloomSettings, SelectiveBloom},
        renderer::PostProcessing,
        resources::Source,
        scene::{ObjectId, Scene},
        time::Tick,
        world::{World, WorldContext},
    };
    use wgpu::Color;
    use winit::dpi::PhysicalSize;

    use crate::common::test_utils::{headless, pixel_is, RecordingWorld};

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Runtime::new().expect("tokio runtime")
    }

    /// Camera two units in front of the origin, looking down -z.
    fn experience_with(runtime: &tokio::runtime::Runtime, clear: Color) -> Experience {
        let config = headless::config(clear)
            .with_camera_position([0.0, 0.0, 2.0])
            .with_camera_target([0.0, 0.0, 0.0]);
        headless::experience(runtime, config, Vec::new(), Box::new(RecordingWorld::new()))
            .expect("headless experience")
    }

    fn add_plane(experience: &mut Experience, size: f32, colour: [f32; 4]) -> scene_experience::scene::ObjectId {
        let ctx = &experience.ctx;
        let mesh = Geometry::plane(size, size, 1, 1).upload(&ctx.device, "plane");
        let material = Material::basic(ctx, "plane", colour, None);
        experience.scene.add(ctx, "plane", mesh, material)
    }

    fn capture(runtime: &tokio::runtime::Runtime, experience: &mut Experience) -> image::RgbaImage {
        runtime.block_on(experience.capture()).expect("capture")
    }

    #[test]
    fn should_render_clear_colour() {
        let runtime = runtime();
        let mut experience = experience_with(&runtime, Color::WHITE);

        let image = capture(&runtime, &mut experience);

        assert_eq!(image.dimensions(), (headless::WIDTH, headless::HEIGHT));
        for pixel in image.pixels() {
            assert!(pixel_is(pixel, [255, 255, 255, 255], 0), "got {pixel:?}");
        }
    }

    #[test]
    fn should_resize_sizes_camera_and_renderer_together() {
        let runtime = runtime();
        let mut experience = experience_with(&runtime, Color::WHITE);

        experience.resize(PhysicalSize::new(96, 48), 1.0);

        let aspect = experience.sizes.width() as f32 / experience.sizes.height() as f32;
        assert_eq!(experience.camera.camera.aspect, aspect);
        assert!((aspect - 2.0).abs() < 1e-6);
        assert_eq!(experience.renderer.size(), [96, 48]);
        assert_eq!(experience.ctx.size(), [96, 48]);
        let image = capture(&runtime, &mut experience);
        assert_eq!(image.dimensions(), (96, 48));
        assert!(image.pixels().all(|p| pixel_is(p, [255, 255, 255, 255], 0)));

        // above the pixel ratio limit the targets shrink but the pointer keeps window pixels
        experience.resize(PhysicalSize::new(96, 48), 3.0);
        assert_eq!((experience.sizes.width(), experience.sizes.height()), (32, 16));
        assert_eq!(experience.renderer.size(), [64, 32]);
        assert_eq!(experience.camera.input.viewport, cgmath::Vector2::new(96.0, 48.0));
        assert!((experience.camera.camera.aspect - 2.0).abs() < 1e-6);
        let image = capture(&runtime, &mut experience);
        assert_eq!(image.dimensions(), (64, 32));
    }

    #[test]
    fn should_render_an_unlit_plane_filling_the_view() {
        let runtime = runtime();
        let mut experience = experience_with(&runtime, Color::BLACK);
        add_plane(&mut experience, 10.0, [1.0, 0.0, 0.0, 1.0]);

        let image = capture(&runtime, &mut experience);

        for pixel in image.pixels() {
            assert!(pixel_is(pixel, [255, 0, 0, 255], 1), "got {pixel:?}");
        }
    }

    #[test]
    fn should_blend_transparent_objects_over_opaque_ones_added_later() {
        const FLAT: &str = "
            @vertex
            fn vs_main(model: VertexInput, instance: InstanceInput) -> VertexOutput {
                return standard_vertex(model, instance);
            }

            @fragment
            fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
                return uniforms.params[0];
            }
        ";
        let runtime = runtime();
        let mut experience = experience_with(&runtime, Color::BLACK);
        let ctx = &experience.ctx;
        let mut glass = Material::shader(
            ctx,
            &ShaderMaterialDescriptor {
                label: "glass",
                source: FLAT,
                transparent: true,
                map: None,
            },
        );
        glass.set_param(0, [1.0, 1.0, 1.0, 0.5]);
        let mesh = Geometry::plane(10.0, 10.0, 1, 1).upload(&ctx.device, "glass");
        let glass = experience.scene.add(ctx, "glass", mesh, glass);
        if let Some(object) = experience.scene.get_mut(glass) {
            object.set_transform(Instance::at(0.0, 0.0, 0.5));
        }
        add_plane(&mut experience, 10.0, [1.0, 0.0, 0.0, 1.0]);

        let image = capture(&runtime, &mut experience);

        // half white over red is (1, 0.5, 0.5) linear
        for pixel in image.pixels() {
            assert!(pixel_is(pixel, [255, 188, 188, 255], 2), "got {pixel:?}");
        }
    }

    #[test]
    fn should_keep_plain_colours_under_selective_bloom() {
        let runtime = runtime();
        let mut experience = experience_with(&runtime, Color::BLACK);
        add_plane(&mut experience, 10.0, [1.0, 0.0, 0.0, 1.0]);
        let bloom = SelectiveBloom::new(&experience.ctx, experience.renderer.size(), BLOOM_LAYER, BloomSettings::default());
        experience
            .renderer
            .set_post_processing(&experience.ctx, PostProcessing::SelectiveBloom(bloom));

        let image = capture(&runtime, &mut experience);

        let centre = image.get_pixel(headless::WIDTH / 2, headless::HEIGHT / 2);
        assert!(pixel_is(centre, [255, 0, 0, 255], 1), "got {centre:?}");
    }

    #[test]
    fn should_spread_glow_only_from_bloom_layer_objects() {
        let runtime = runtime();
        let sample = |glowing: bool| {
            let mut experience = experience_with(&runtime, Color::BLACK);
            let id = add_plane(&mut experience, 0.2, [1.0, 1.0, 1.0, 1.0]);
            if let Some(object) = experience.scene.get_mut(id) {
                object.material.set_emissive([8.0, 8.0, 8.0, 1.0]);
                if glowing {
                    object.layers.enable(BLOOM_LAYER);
                }
            }
            let bloom = SelectiveBloom::new(&experience.ctx, experience.renderer.size(), BLOOM_LAYER, BloomSettings::default());
            experience
                .renderer
                .set_post_processing(&experience.ctx, PostProcessing::SelectiveBloom(bloom));
            let image = capture(&runtime, &mut experience);
            // a few pixels right of the quad's edge
            *image.get_pixel(headless::WIDTH / 2 + 8, headless::HEIGHT / 2)
        };

        let plain = sample(false);
        let glowing = sample(true);

        assert!(pixel_is(&plain, [0, 0, 0, 255], 0), "got {plain:?}");
        assert!(glowing.0[0] > 0, "got {glowing:?}");
    }

    #[test]
    fn should_show_a_render_target_as_a_material_map() {
        let runtime = runtime();
        let green = Color {
            r: 0.0,
            g: 1.0,
            b: 0.0,
            a: 1.0,
        };
        let mut experience = experience_with(&runtime, green);

        let target = RenderTarget::new(&experience.ctx.device, [16, 16], "film");
        {
            let ctx = &experience.ctx;
            let mesh = Geometry::plane(10.0, 10.0, 1, 1).upload(&ctx.device, "screen");
            let material = Material::basic(ctx, "screen", [1.0, 0.0, 1.0, 1.0], Some(&target.colour));
            let id = experience.scene.add(ctx, "screen", mesh, material);
            if let Some(object) = experience.scene.get_mut(id) {
                object.layers.set(SCREEN_LAYER);
            }
        }
        experience.camera.camera.layers.enable(SCREEN_LAYER);

        // the film only sees layer 0, which is empty, so it is the green background
        experience.renderer.render_to_target(
            &experience.ctx,
            &experience.scene,
            &experience.camera.resources.bind_group,
            Layers::new(),
            &target,
        );
        let image = capture(&runtime, &mut experience);

        // magenta tint times the green film is black, anything else means the map was ignored
        let centre = image.get_pixel(headless::WIDTH / 2, headless::HEIGHT / 2);
        assert!(pixel_is(centre, [0, 0, 0, 255], 1), "got {centre:?}");
    }

    const SCREEN_LAYER: u32 = 2;

    /// Films a green plane that `update` moves into view and shows the film on a screen
    /// only the main camera sees.
    #[derive(Default)]
    struct Filming {
        subject: Option<ObjectId>,
        film: Option<(CameraResources, RenderTarget)>,
    }

    impl World for Filming {
        fn on_init(&mut self, world: &mut WorldContext, scene: &mut Scene) -> anyhow::Result<()> {
            let ctx = world.ctx;
            let target = RenderTarget::new(&ctx.device, [16, 16], "film");
            let screen = Material::basic(ctx, "screen", [1.0, 1.0, 1.0, 1.0], Some(&target.colour));
            let mesh = Geometry::plane(10.0, 10.0, 1, 1).upload(&ctx.device, "screen");
            let screen = scene.add(ctx, "screen", mesh, screen);
            if let Some(object) = scene.get_mut(screen) {
                object.layers.set(SCREEN_LAYER);
            }
            world.camera.layers.set(SCREEN_LAYER);

            let mesh = Geometry::plane(10.0, 10.0, 1, 1).upload(&ctx.device, "subject");
            let material = Material::basic(ctx, "subject", [0.0, 1.0, 0.0, 1.0], None);
            let subject = scene.add(ctx, "subject", mesh, material);
            // behind the camera until the first update
            if let Some(object) = scene.get_mut(subject) {
                object.set_transform(Instance::at(0.0, 0.0, 5.0));
            }
            self.subject = Some(subject);
            let resources = CameraResources::new(&ctx.device, &ctx.layouts.camera, "film");
            self.film = Some((resources, target));
            Ok(())
        }

        fn update(&mut self, _world: &mut WorldContext, scene: &mut Scene, _tick: Tick) {
            if let Some(object) = self.subject.and_then(|id| scene.get_mut(id)) {
                object.set_transform(Instance::new());
            }
        }

        fn on_render(&mut self, world: &mut WorldContext, scene: &Scene, _tick: Tick) {
            let Some((resources, target)) = &mut self.film else {
                return;
            };
            resources.write(&world.ctx.queue, world.camera);
            world
                .renderer
                .render_to_target(world.ctx, scene, &resources.bind_group, Layers::new(), target);
        }
    }

    #[test]
    fn should_film_the_transforms_of_the_current_frame() {
        let runtime = runtime();
        let config = headless::config(Color::BLACK)
            .with_camera_position([0.0, 0.0, 2.0])
            .with_camera_target([0.0, 0.0, 0.0]);
        let mut experience =
            headless::experience(&runtime, config, Vec::new(), Box::new(Filming::default()))
                .expect("headless experience");

        let image = capture(&runtime, &mut experience);

        // black would mean the film still saw the subject where on_init left it
        let centre = image.get_pixel(headless::WIDTH / 2, headless::HEIGHT / 2);
        assert!(pixel_is(centre, [0, 255, 0, 255], 1), "got {centre:?}");
    }

    #[test]
    fn should_call_world_hooks_in_order() {
        let runtime = runtime();
        let world = RecordingWorld::new();
        let config = headless::config(Color::BLACK);
        let mut experience = headless::experience(
            &runtime,
            config,
            vec![Source::texture("checker", "textures/checker.png")],
            Box::new(world.clone()),
        )
        .expect("headless experience");
        assert_eq!(world.invocations().init, 1);
        assert_eq!(world.invocations().ready, 0);

        let mut frames = 0;
        while world.invocations().ready == 0 && frames < 500 {
            capture(&runtime, &mut experience);
            frames += 1;
            std::thread::sleep(Duration::from_millis(5));
        }
        for _ in 0..3 {
            capture(&runtime, &mut experience);
            frames += 1;
        }

        let invocations = world.invocations();
        assert_eq!(invocations.init, 1);
        assert_eq!(invocations.ready, 1);
        assert_eq!(invocations.update, frames);
        assert_eq!(invocations.render, frames);
        assert!(experience.resources.is_ready());
    }
}
