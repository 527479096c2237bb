use std::path::PathBuf;

use anyhow::{Context, Result};

use quadshade_engine::coords::{Affine2, Vec2, Viewport};
use quadshade_engine::core::{App, AppControl, FrameCtx};
use quadshade_engine::device::{Gpu, GpuInit};
use quadshade_engine::logging::{init_logging, LoggingConfig};
use quadshade_engine::paint::{BlendMode, Color};
use quadshade_engine::render::{
    create_shader_plugin, PluginHandle, PluginRegistry, ShaderSprite, UniformSet, WgpuBackend,
    TINT_ALPHA_UNIFORM,
};
use quadshade_engine::window::{Runtime, RuntimeConfig, WindowId};

const USAGE: &str = "usage: quadshade-studio [fragment.wgsl]

The optional fragment shader gets the default vertex stage and must declare
`uTime: f32` in its `@group(1) @binding(0)` uniform struct.";

/// Where an actor sits each frame.
#[derive(Debug, Copy, Clone)]
enum Placement {
    /// Fraction of the viewport.
    Fixed(Vec2),
    /// Circles an earlier actor at `radius` in that actor's local space.
    Orbit { parent: usize, radius: f32 },
}

/// Animated sprite drawn by one plugin.
struct Actor {
    plugin: PluginHandle,
    sprite: ShaderSprite,
    placement: Placement,
    spin: f32,
}

/// World transform of every actor at time `t`. Orbiting actors inherit their
/// parent's transform.
fn layout(actors: &[Actor], viewport: Viewport, t: f32) -> Vec<Affine2> {
    let mut worlds: Vec<Affine2> = Vec::with_capacity(actors.len());
    for actor in actors {
        let world = match actor.placement {
            Placement::Fixed(at) => {
                let pos = Vec2::new(at.x * viewport.width, at.y * viewport.height);
                let pulse = 1.0 + 0.05 * (t * 2.0 + at.x * 10.0).sin();
                Affine2::from_trs(pos, t * actor.spin, Vec2::splat(pulse))
            }
            Placement::Orbit { parent, radius } => {
                let parent = worlds.get(parent).copied().unwrap_or_default();
                parent
                    * Affine2::rotation(t * actor.spin)
                    * Affine2::translation(radius, 0.0)
                    * Affine2::scale(0.5, 0.5)
            }
        };
        worlds.push(world);
    }
    worlds
}

struct Studio {
    registry: PluginRegistry<WgpuBackend>,
    backend: Option<WgpuBackend>,
    actors: Vec<Actor>,
}

impl Studio {
    fn new(user_fragment: Option<String>) -> Result<Self> {
        let mut registry = PluginRegistry::new();

        let wave = create_shader_plugin(
            "wave",
            None,
            include_str!("../shaders/wave.wgsl"),
            UniformSet::new().with("uTime", 0.0f32).with("uFrequency", 12.0f32),
        )
        .register(&mut registry)?;

        let rings = create_shader_plugin(
            "rings",
            None,
            include_str!("../shaders/rings.wgsl"),
            UniformSet::new().with("uTime", 0.0f32).with("uRings", 6i32),
        )
        .register(&mut registry)?;

        let checker = create_shader_plugin(
            "checker",
            Some(include_str!("../shaders/checker_vert.wgsl")),
            include_str!("../shaders/checker_frag.wgsl"),
            UniformSet::new().with("uTime", 0.0f32).with("uCells", 8.0f32),
        )
        .register(&mut registry)?;

        let centered = Vec2::splat(0.5);
        let mut actors = vec![
            Actor {
                plugin: wave,
                sprite: ShaderSprite::new(Vec2::new(320.0, 200.0)).with_anchor(centered),
                placement: Placement::Fixed(Vec2::new(0.3, 0.35)),
                spin: 0.2,
            },
            Actor {
                plugin: checker,
                sprite: ShaderSprite::new(Vec2::new(220.0, 220.0))
                    .with_anchor(centered)
                    .with_tint(0xFFB070, 0.9),
                placement: Placement::Fixed(Vec2::new(0.7, 0.35)),
                spin: -0.35,
            },
            // Moon of the checker quad.
            Actor {
                plugin: wave,
                sprite: ShaderSprite::new(Vec2::new(90.0, 90.0))
                    .with_anchor(centered)
                    .with_tint(0xA0FFA0, 0.8),
                placement: Placement::Orbit {
                    parent: 1,
                    radius: 180.0,
                },
                spin: 1.2,
            },
            Actor {
                plugin: rings,
                sprite: ShaderSprite::new(Vec2::new(260.0, 260.0))
                    .with_anchor(centered)
                    .with_tint(0x60C0FF, 1.0)
                    .with_blend_mode(BlendMode::Add),
                placement: Placement::Fixed(Vec2::new(0.5, 0.7)),
                spin: 0.0,
            },
            // Explicit tint override; the sprite tint is ignored.
            Actor {
                plugin: rings,
                sprite: ShaderSprite::new(Vec2::new(140.0, 140.0))
                    .with_anchor(centered)
                    .with_blend_mode(BlendMode::Screen)
                    .with_uniforms(
                        UniformSet::new()
                            .with(TINT_ALPHA_UNIFORM, [0.9f32, 0.2, 0.4, 0.9])
                            .with("uRings", 3i32),
                    ),
                placement: Placement::Fixed(Vec2::new(0.18, 0.75)),
                spin: 0.0,
            },
        ];

        if let Some(fragment) = user_fragment {
            let user = create_shader_plugin(
                "user",
                None,
                &fragment,
                UniformSet::new().with("uTime", 0.0f32),
            )
            .register(&mut registry)?;

            actors.push(Actor {
                plugin: user,
                sprite: ShaderSprite::new(Vec2::new(240.0, 240.0)).with_anchor(centered),
                placement: Placement::Fixed(Vec2::new(0.82, 0.75)),
                spin: 0.1,
            });
        }

        Ok(Self {
            registry,
            backend: None,
            actors,
        })
    }
}

impl App for Studio {
    fn on_context_init(&mut self, window_id: WindowId, gpu: &Gpu<'_>) -> Result<()> {
        let mut backend = WgpuBackend::new(gpu.device_arc(), gpu.queue_arc(), gpu.surface_format());
        self.registry
            .on_context_init(&mut backend)
            .with_context(|| format!("shader plugins failed for window {window_id:?}"))?;
        self.backend = Some(backend);
        Ok(())
    }

    fn on_context_lost(&mut self, _window_id: WindowId) {
        self.backend = None;
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let Self {
            registry,
            backend,
            actors,
        } = self;
        let Some(backend) = backend.as_mut() else {
            return AppControl::Continue;
        };

        let t = ctx.time.elapsed;
        let worlds = layout(actors, ctx.window.viewport(), t);
        for (actor, world) in actors.iter_mut().zip(worlds) {
            actor.sprite.transform.set_world(world);
            actor
                .sprite
                .uniforms
                .get_or_insert_with(UniformSet::new)
                .set("uTime", t);
        }

        ctx.render(backend, Color::from_hex(0x101018, 1.0), |backend| {
            for actor in actors.iter_mut() {
                if let Err(e) = registry.render(actor.plugin, backend, &mut actor.sprite) {
                    log::error!("render failed: {e}");
                }
            }
            registry.flush(backend);
        })
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let mut args = std::env::args_os().skip(1);
    let first = args.next();
    if args.next().is_some() || first.as_ref().is_some_and(|a| a == "-h" || a == "--help") {
        eprintln!("{USAGE}");
        return Ok(());
    }
    let path = first.map(PathBuf::from);

    let user_fragment = path
        .map(|p| {
            std::fs::read_to_string(&p).with_context(|| format!("failed to read {}", p.display()))
        })
        .transpose()?;

    let studio = Studio::new(user_fragment)?;
    log::info!("{} shader plugin(s) registered", studio.registry.len());

    Runtime::run(
        RuntimeConfig {
            title: "quadshade studio".to_string(),
            ..RuntimeConfig::default()
        },
        GpuInit::default(),
        studio,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_plugins_are_registered() {
        let studio = Studio::new(None).unwrap();
        assert_eq!(studio.registry.len(), 3);
        assert!(studio.registry.handle("wave").is_some());
        assert!(studio.registry.handle("checker").is_some());
        assert_eq!(studio.actors.len(), 5);
        assert!(studio.backend.is_none());
    }

    #[test]
    fn user_fragment_adds_a_plugin_and_actor() {
        let fragment = "@fragment fn fs_main() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }";
        let studio = Studio::new(Some(fragment.to_string())).unwrap();
        let user = studio.registry.handle("user").unwrap();
        assert_eq!(studio.registry.len(), 4);
        assert_eq!(studio.actors.last().map(|a| a.plugin), Some(user));
    }

    #[test]
    fn orbiting_actor_follows_its_parent() {
        let studio = Studio::new(None).unwrap();
        let viewport = Viewport::new(800.0, 600.0);
        for t in [0.0f32, 0.7, 3.1] {
            let worlds = layout(&studio.actors, viewport, t);
            for (actor, world) in studio.actors.iter().zip(&worlds) {
                let Placement::Orbit { parent, radius } = actor.placement else {
                    continue;
                };
                assert!(parent < worlds.len());
                let center = world.apply(Vec2::zero());
                let expected = (worlds[parent] * Affine2::rotation(t * actor.spin))
                    .apply(Vec2::new(radius, 0.0));
                assert!((center.x - expected.x).abs() < 1e-3);
                assert!((center.y - expected.y).abs() < 1e-3);
            }
        }
    }
}
