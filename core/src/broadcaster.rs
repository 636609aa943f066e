use std::future::Future;

use crate::game::types::GameEndReason;

/// Render-space rectangle of one cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellRect {
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

/// Everything the presentation layer needs to repaint after one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderFrame {
    pub head: CellRect,
    pub tail: Vec<CellRect>,
    /// HSL hue for the tail, shifting with tail length.
    pub tail_hue: f32,
    pub apple: Option<CellRect>,
}

/// Boundary the core emits through; the presentation layer subscribes by
/// implementing it.
pub trait RenderSink: Send + Sync + Clone + 'static {
    fn frame(&self, frame: RenderFrame) -> impl Future<Output = ()> + Send;

    fn score_changed(&self, new_score: u32) -> impl Future<Output = ()> + Send;

    fn game_over(
        &self,
        final_score: u32,
        reason: GameEndReason,
    ) -> impl Future<Output = ()> + Send;
}
