use eframe::egui::{self, Align2, Color32, FontId, Id, Painter, Pos2, Rect, Sense, Stroke, Ui, vec2};
use crate::knowledge::UniverseId;
use crate::layout::ambient_scatter;
use crate::util::stable_seed;

use super::super::ViewModel;
use super::super::camera::OrbitCamera;
use super::super::render_utils::{
    blend_color, circle_visible, draw_starfield, edge_visible, fog_amount, fog_far, node_color,
    with_opacity,
};
use super::super::theme::{Theme, universe_color};
use super::interaction::{ScreenTarget, hovered_target};

const STAR_SHELL_MIN: f32 = 300.0;
const STAR_SHELL_MAX: f32 = 350.0;
/// egui tessellates every star separately, so only a share of the configured count is drawn.
const STAR_SAMPLE_DIVISOR: usize = 5;
const EDGE_OPACITY: f32 = 0.3;
const LABEL_OPACITY_THRESHOLD: f32 = 0.5;
const OPACITY_EASE_SECS: f32 = 0.35;
const HOVER_EASE_SECS: f32 = 0.15;
const HOVER_SCALE: f32 = 0.2;
const LOBBY_PORTAL_SIZE: f32 = 10.0;

struct NodeSprite {
    slot: usize,
    id: String,
    label: String,
    screen: Pos2,
    radius: f32,
    depth: f32,
    opacity: f32,
    color: Color32,
    locked: bool,
    completed: bool,
}

impl ViewModel {
    fn ensure_star_field(&mut self, universe: UniverseId, star_count: usize) {
        self.star_fields.entry(universe).or_insert_with(|| {
            ambient_scatter(
                stable_seed(universe.key()),
                star_count / STAR_SAMPLE_DIVISOR,
                STAR_SHELL_MIN,
                STAR_SHELL_MAX,
            )
        });
    }

    fn draw_backdrop(&mut self, painter: &Painter, rect: Rect, camera: &OrbitCamera, theme: &Theme) {
        painter.rect_filled(rect, 0.0, theme.background);
        if !theme.shows_stars() {
            return;
        }

        let universe = self.controller.active();
        self.ensure_star_field(universe, theme.star_count);
        if let Some(stars) = self.star_fields.get(&universe) {
            draw_starfield(painter, rect, camera, stars, Color32::from_gray(230));
        }
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        let ctx = ui.ctx().clone();
        let now = Self::now(&ctx);

        if self.lesson.is_none() {
            self.handle_camera_dolly(ui, &response);
            self.handle_camera_orbit(&response);
        }

        let theme = self.theme();
        let camera = *self.controller.camera().camera();
        self.draw_backdrop(&painter, rect, &camera, &theme);

        let universe = self.controller.active();
        let far = fog_far(self.controller.path().len());
        let projection = self.controller.projection().clone();
        let Some(tree) = self.controller.tree() else {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "This universe has no knowledge tree.",
                FontId::proportional(16.0),
                theme.text(),
            );
            return;
        };

        let mut sprites = Vec::with_capacity(projection.nodes.len());
        for (slot, node) in projection.nodes.iter().enumerate() {
            let Some(projected) = camera.project(node.position, rect) else {
                continue;
            };
            let radius = (node.size * projected.scale).max(2.0);
            if !circle_visible(rect, projected.screen, radius * (1.0 + HOVER_SCALE)) {
                continue;
            }

            let opacity = ctx.animate_value_with_time(
                Id::new(("node_opacity", universe.key(), node.id.as_str())),
                node.opacity,
                OPACITY_EASE_SECS,
            );
            let lit = node_color(theme.primary, theme.glow, node.progress, node.completed, node.is_locked);
            let fogged = blend_color(lit, theme.fog, fog_amount(projected.depth, far));

            sprites.push(NodeSprite {
                slot,
                id: node.id.clone(),
                label: tree
                    .node(node.index)
                    .map_or_else(|| node.id.clone(), |entry| entry.node.label.clone()),
                screen: projected.screen,
                radius,
                depth: projected.depth,
                opacity,
                color: fogged,
                locked: node.is_locked,
                completed: node.completed,
            });
        }

        let mut links = 0usize;
        for edge in &projection.edges {
            let (Some(start), Some(end)) = (camera.project(edge.from, rect), camera.project(edge.to, rect))
            else {
                continue;
            };
            if !edge_visible(rect, start.screen, end.screen, 2.0) {
                continue;
            }
            let fog = fog_amount((start.depth + end.depth) * 0.5, far);
            let color = with_opacity(blend_color(theme.primary, theme.fog, fog), EDGE_OPACITY);
            painter.line_segment([start.screen, end.screen], Stroke::new(1.0, color));
            links += 1;
        }

        let targets = sprites
            .iter()
            .map(|sprite| ScreenTarget {
                slot: sprite.slot,
                screen: sprite.screen,
                radius: sprite.radius,
                depth: sprite.depth,
            })
            .collect::<Vec<_>>();
        let hovered = if self.lesson.is_none() {
            hovered_target(ui, &targets).map(|target| target.slot)
        } else {
            None
        };
        if hovered.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }

        sprites.sort_by(|a, b| b.depth.total_cmp(&a.depth));
        for sprite in &sprites {
            let is_hovered = hovered == Some(sprite.slot);
            let hover = ctx.animate_bool_with_time(
                Id::new(("node_hover", universe.key(), sprite.id.as_str())),
                is_hovered,
                HOVER_EASE_SECS,
            );
            draw_sphere(&painter, sprite, 1.0 + hover * HOVER_SCALE, &theme);

            if is_hovered || sprite.opacity > LABEL_OPACITY_THRESHOLD {
                let radius = sprite.radius * (1.0 + hover * HOVER_SCALE);
                painter.text(
                    sprite.screen + vec2(0.0, radius + 4.0),
                    Align2::CENTER_TOP,
                    sprite.label.as_str(),
                    FontId::proportional(12.0),
                    with_opacity(theme.text(), sprite.opacity.max(0.6)),
                );
            }
        }

        self.visible_node_count = sprites.len();
        self.visible_edge_count = links;

        let Some(slot) = hovered else {
            return;
        };
        let Some(node) = projection.nodes.get(slot) else {
            return;
        };

        let status = if node.completed {
            "mastered".to_owned()
        } else if node.is_locked {
            "locked".to_owned()
        } else {
            format!("{:.0}%", node.progress)
        };
        painter.text(
            rect.left_top() + vec2(10.0, 10.0),
            Align2::LEFT_TOP,
            format!("{}  |  depth {}  |  {status}", node.id, node.depth),
            FontId::proportional(13.0),
            theme.text(),
        );

        if response.double_clicked() {
            self.open_lesson(&node.id);
        } else if response.clicked_by(egui::PointerButton::Primary) {
            self.controller.activate_node(&node.id, now);
        }
    }

    pub(in crate::app) fn draw_lobby(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        let ctx = ui.ctx().clone();
        let now = Self::now(&ctx);

        self.handle_camera_dolly(ui, &response);
        self.handle_camera_orbit(&response);

        let theme = self.theme();
        let camera = *self.controller.camera().camera();
        self.draw_backdrop(&painter, rect, &camera, &theme);

        let mut portals = UniverseId::GRAPHS
            .iter()
            .enumerate()
            .filter_map(|(slot, universe)| {
                let projected = camera.project(universe.lobby_anchor(), rect)?;
                Some((
                    *universe,
                    ScreenTarget {
                        slot,
                        screen: projected.screen,
                        radius: LOBBY_PORTAL_SIZE * projected.scale,
                        depth: projected.depth,
                    },
                ))
            })
            .collect::<Vec<_>>();
        let targets = portals.iter().map(|(_, target)| *target).collect::<Vec<_>>();
        let hovered = hovered_target(ui, &targets).map(|target| target.slot);
        if hovered.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }

        portals.sort_by(|a, b| b.1.depth.total_cmp(&a.1.depth));
        for (universe, target) in &portals {
            let hover = ctx.animate_bool_with_time(
                Id::new(("portal_hover", universe.key())),
                hovered == Some(target.slot),
                HOVER_EASE_SECS,
            );
            let radius = target.radius * (1.0 + hover * HOVER_SCALE);
            let color = universe_color(*universe);
            painter.circle_filled(target.screen, radius, blend_color(Color32::BLACK, color, 0.85));
            painter.circle_filled(
                target.screen - vec2(radius * 0.3, radius * 0.3),
                radius * 0.45,
                with_opacity(Color32::WHITE, 0.15),
            );
            painter.circle_stroke(
                target.screen,
                radius * 1.15,
                Stroke::new(1.0 + hover, with_opacity(color, 0.4 + hover * 0.4)),
            );
            painter.text(
                target.screen + vec2(0.0, radius * 1.15 + 8.0),
                Align2::CENTER_TOP,
                universe.label(),
                FontId::proportional(16.0),
                theme.text(),
            );
        }

        painter.text(
            rect.center_top() + vec2(0.0, 24.0),
            Align2::CENTER_TOP,
            "Choose a universe",
            FontId::proportional(20.0),
            theme.text(),
        );

        if response.clicked_by(egui::PointerButton::Primary)
            && let Some(slot) = hovered
            && let Some(universe) = UniverseId::GRAPHS.get(slot)
        {
            self.controller.switch_universe(*universe, now);
        }
    }
}

fn draw_sphere(painter: &Painter, sprite: &NodeSprite, scale: f32, theme: &Theme) {
    let radius = sprite.radius * scale;
    let opacity = sprite.opacity;

    painter.circle_filled(sprite.screen, radius, with_opacity(sprite.color, opacity));
    painter.circle_filled(
        sprite.screen - vec2(radius * 0.3, radius * 0.3),
        radius * 0.45,
        with_opacity(Color32::WHITE, 0.12 * opacity),
    );
    painter.circle_stroke(
        sprite.screen,
        radius,
        Stroke::new(1.0, with_opacity(blend_color(sprite.color, Color32::BLACK, 0.5), opacity)),
    );

    if sprite.completed {
        painter.circle_stroke(
            sprite.screen,
            radius * 1.35,
            Stroke::new(1.5, with_opacity(theme.glow, 0.8 * opacity)),
        );
    }

    if sprite.locked {
        // Padlock: shackle over a body.
        let unit = (radius * 0.5).clamp(3.0, 12.0);
        let body = Rect::from_center_size(sprite.screen + vec2(0.0, unit * 0.3), vec2(unit * 1.4, unit));
        let ink = with_opacity(Color32::from_gray(30), opacity);
        painter.circle_stroke(sprite.screen - vec2(0.0, unit * 0.3), unit * 0.45, Stroke::new(1.5, ink));
        painter.rect_filled(body, 2.0, with_opacity(Color32::from_gray(220), opacity));
    }
}
