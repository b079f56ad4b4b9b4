//! Per-frame overlay pass: filter, project, lay out, draw.
//!
//! Nothing survives between frames. The search lock is held only while the
//! candidate list is built, never while drawing.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::SharedSearch;
use crate::canvas::Canvas;
use crate::config::{OverlayConfig, OverlayStyle};
use crate::entity::{Entity, EntitySource, filter_candidates};
use crate::error::{Error, IntoCoreError, Result};
use crate::layout::place_label;

/// Client states during which nothing is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientCondition {
    OccupiedInCutSceneEvent,
    WatchingCutscene,
    BetweenAreas,
    CreatingCharacter,
    LoggingOut,
}

impl ClientCondition {
    pub const ALL: [ClientCondition; 5] = [
        ClientCondition::OccupiedInCutSceneEvent,
        ClientCondition::WatchingCutscene,
        ClientCondition::BetweenAreas,
        ClientCondition::CreatingCharacter,
        ClientCondition::LoggingOut,
    ];
}

/// Session flags of the host client.
pub trait ClientState {
    fn is_logged_in(&self) -> bool;

    fn is_in_pvp(&self) -> bool;

    fn has_condition(&self, condition: ClientCondition) -> bool;
}

/// Owned client flags, for hosts that poll once per frame and for tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSnapshot {
    pub logged_in: bool,
    pub in_pvp: bool,
    pub conditions: Vec<ClientCondition>,
}

impl ClientSnapshot {
    /// Logged in, out of PvP, no conditions.
    pub fn in_world() -> Self {
        Self {
            logged_in: true,
            ..Self::default()
        }
    }
}

impl ClientState for ClientSnapshot {
    fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    fn is_in_pvp(&self) -> bool {
        self.in_pvp
    }

    fn has_condition(&self, condition: ClientCondition) -> bool {
        self.conditions.contains(&condition)
    }
}

/// Why a frame was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason", content = "condition")]
pub enum Suppression {
    NotLoggedIn,
    Pvp,
    Condition(ClientCondition),
}

pub fn suppression<C: ClientState + ?Sized>(client: &C, hide_in_pvp: bool) -> Option<Suppression> {
    if !client.is_logged_in() {
        return Some(Suppression::NotLoggedIn);
    }
    if let Some(condition) = ClientCondition::ALL
        .into_iter()
        .find(|c| client.has_condition(*c))
    {
        return Some(Suppression::Condition(condition));
    }
    if hide_in_pvp && client.is_in_pvp() {
        return Some(Suppression::Pvp);
    }
    None
}

/// World-to-screen transform of the host camera.
pub trait Projector {
    /// `None` when the point is behind the camera or off screen.
    fn world_to_screen(&self, world: Vec3) -> Option<Vec2>;
}

impl<F> Projector for F
where
    F: Fn(Vec3) -> Option<Vec2>,
{
    fn world_to_screen(&self, world: Vec3) -> Option<Vec2> {
        self(world)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FrameStats {
    pub suppressed: Option<Suppression>,
    /// Eligible entities whose name matched.
    pub candidates: usize,
    /// Candidates dropped because they did not project on screen.
    pub offscreen: usize,
    pub drawn: usize,
}

pub struct OverlayRenderer<S, P, C> {
    search: SharedSearch,
    entities: S,
    projector: P,
    client: C,
    style: OverlayStyle,
    hide_in_pvp: bool,
}

impl<S, P, C> OverlayRenderer<S, P, C>
where
    S: EntitySource,
    P: Projector,
    C: ClientState,
{
    pub fn new(
        search: SharedSearch,
        entities: S,
        projector: P,
        client: C,
        config: &OverlayConfig,
    ) -> Self {
        Self {
            search,
            entities,
            projector,
            client,
            style: config.style.clone(),
            hide_in_pvp: config.hide_in_pvp,
        }
    }

    /// Hosts that keep one renderer alive swap in the new frame's entities here.
    pub fn entities_mut(&mut self) -> &mut S {
        &mut self.entities
    }

    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    pub fn render_frame<K: Canvas + ?Sized>(&self, canvas: &mut K) -> Result<FrameStats> {
        let mut stats = FrameStats::default();

        if let Some(reason) = suppression(&self.client, self.hide_in_pvp) {
            stats.suppressed = Some(reason);
            tracing::trace!(?reason, "Overlay frame suppressed");
            return Ok(stats);
        }

        let candidates: Vec<&S::Entity> = {
            let search = self
                .search
                .read()
                .with_lock_error(Error::AcquireSearchLock)?;
            if !search.has_any() {
                return Ok(stats);
            }
            filter_candidates(self.entities.entities(), &search).collect()
        };
        stats.candidates = candidates.len();

        let viewport = canvas.viewport();
        let metrics = self.style.metrics();

        for entity in candidates {
            // Host projectors are not required to clip to the canvas.
            let Some(anchor) = self
                .projector
                .world_to_screen(entity.position())
                .filter(|anchor| viewport.contains(*anchor))
            else {
                stats.offscreen += 1;
                continue;
            };

            let name = entity.name();
            let text_size = canvas.measure_text(name);
            let placement = place_label(anchor, text_size, &metrics, &viewport);

            canvas.draw_circle(
                placement.anchor,
                self.style.marker_radius,
                self.style.marker_color,
                self.style.marker_thickness,
            );
            canvas.draw_filled_rounded_rect(
                placement.label_min,
                placement.label_max,
                self.style.label_background,
                self.style.label_rounding,
            );
            canvas.draw_text(placement.text_pos, self.style.text_color, name);
            stats.drawn += 1;
        }

        tracing::trace!(
            candidates = stats.candidates,
            offscreen = stats.offscreen,
            drawn = stats.drawn,
            "Overlay frame rendered"
        );
        Ok(stats)
    }
}
