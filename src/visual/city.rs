use nannou::prelude::*;

use crate::mapper::ElementColor;
use crate::scene::{FrameSummary, Scene};

/// Draws a scene from a fixed camera above and in front of the origin.
pub struct CityView {
    pub pixels_per_unit: f32,
    /// Screen-space squash of the ground plane's depth axis.
    pub tilt: f32,
    /// World height drawn per unit of element scale.
    pub height_gain: f32,
    /// Distance from the camera to the scene centre, for fog.
    pub camera_distance: f32,
    pub ground_offset: f32,
    /// `(group, element)` pairs, far rows first so nearer bars overlap them.
    draw_order: Vec<(usize, usize)>,
}

impl CityView {
    /// Anchors never move after layout, so the painter order is fixed here.
    pub fn new(window_height: f32, scene: &Scene) -> Self {
        Self {
            pixels_per_unit: window_height / 28.0,
            tilt: 0.45,
            height_gain: 0.35,
            camera_distance: 15.0,
            ground_offset: -window_height * 0.12,
            draw_order: draw_order(scene),
        }
    }

    pub fn draw(&self, app: &App, frame: Frame, scene: &Scene, summary: &FrameSummary) {
        let draw = app.draw();
        let fx = summary.effects;

        // skybox pulse tints the background
        let pulse = fx.skybox_pulse.clamp(0.0, 1.0);
        draw.background()
            .color(rgb(0.02 + 0.04 * pulse, 0.02, 0.05 + 0.12 * pulse));

        let groups = scene.groups();
        let glow_alpha = (0.12 * fx.bloom_strength).clamp(0.0, 0.6);
        for &(g, i) in &self.draw_order {
            let Some(e) = groups.get(g).and_then(|group| group.elements().get(i)) else {
                continue;
            };
            let state = &e.state;
            let x = e.anchor.x * self.pixels_per_unit;
            let ground = self.ground_offset - e.anchor.z * self.tilt * self.pixels_per_unit;
            let bottom = (state.vertical_offset - state.scale / 2.0) * self.height_gain;
            let top = (state.vertical_offset + state.scale / 2.0) * self.height_gain;
            let p0 = pt2(x, ground + bottom * self.pixels_per_unit);
            let p1 = pt2(x, ground + top * self.pixels_per_unit);

            let fog = (-fx.fog_density * (self.camera_distance - e.anchor.z)).exp();
            let (h, s, l) = resolve(state.color);
            let weight = (e.base_width * self.pixels_per_unit).max(1.0);

            // outline glow
            draw.line()
                .start(p0)
                .end(p1)
                .weight(weight * (1.0 + fx.outline_strength))
                .color(hsla(h, s, l, glow_alpha * fog));

            draw.line()
                .start(p0)
                .end(p1)
                .weight(weight)
                .color(hsla(h, s, l, 0.95 * fog));
        }

        if let Err(e) = draw.to_frame(app, &frame) {
            log::error!("failed to draw frame: {e:?}");
        }
    }
}

fn draw_order(scene: &Scene) -> Vec<(usize, usize)> {
    let groups = scene.groups();
    let mut order: Vec<(usize, usize)> = groups
        .iter()
        .enumerate()
        .flat_map(|(g, group)| (0..group.elements().len()).map(move |i| (g, i)))
        .collect();
    let z = |&(g, i): &(usize, usize)| groups[g].elements()[i].anchor.z;
    order.sort_by(|a, b| z(a).total_cmp(&z(b)));
    order
}

/// Emissive intensity becomes the lightness of a fixed cyan.
fn resolve(color: ElementColor) -> (f32, f32, f32) {
    match color {
        ElementColor::Hsl {
            hue,
            saturation,
            lightness,
        } => (hue, saturation, lightness),
        ElementColor::Emissive(intensity) => (0.5, 1.0, (intensity * 0.3).clamp(0.05, 0.9)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;

    #[test]
    fn test_draw_order_covers_scene_back_to_front() {
        let scene = Scene::build(&SceneConfig::layered()).unwrap();
        let view = CityView::new(800.0, &scene);
        assert_eq!(view.draw_order.len(), scene.element_count());

        let depths: Vec<f32> = view
            .draw_order
            .iter()
            .map(|&(g, i)| scene.groups()[g].elements()[i].anchor.z)
            .collect();
        assert!(depths.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn test_emissive_resolves_to_bounded_lightness() {
        assert_eq!(resolve(ElementColor::Emissive(0.0)), (0.5, 1.0, 0.05));
        assert_eq!(resolve(ElementColor::Emissive(100.0)), (0.5, 1.0, 0.9));
        let hsl = ElementColor::Hsl {
            hue: 0.1,
            saturation: 0.2,
            lightness: 0.3,
        };
        assert_eq!(resolve(hsl), (0.1, 0.2, 0.3));
    }
}
