use log::debug;
use serde::Serialize;
use std::mem;
use std::time::Duration;

use crate::arc::ArcShape;
use crate::color::{ColorScale, Rgb};
use crate::config::{Config, Dimensions};
use crate::expense::{Expense, ExpenseId};
use crate::pie::{Angles, PieSlice, pie_layout};
use crate::transition::{ArcTween, FillTween, Phase};

/// Fill of a hovered slice
pub const HIGHLIGHT: Rgb = Rgb::WHITE;

/// Outline drawn around every slice
pub const STROKE: Rgb = Rgb::WHITE;
pub const STROKE_WIDTH: u32 = 3;

/// Legend circle radius and the gap between two entries
pub const LEGEND_RADIUS: f64 = 10.0;
pub const LEGEND_PADDING: f64 = 10.0;

/// Offset of the tooltip from the pointer
const TOOLTIP_OFFSET: (f64, f64) = (12.0, -28.0);

/// A slice currently on the drawing surface
#[derive(Clone, Debug)]
struct RenderedSlice {
    datum: PieSlice,
    phase: Phase,
    arc: ArcTween,
    fill: FillTween,
}

impl RenderedSlice {
    fn phase_at(&self, now: Duration) -> Phase {
        if self.phase != Phase::Exiting && self.arc.is_finished(now) {
            Phase::Steady
        } else {
            self.phase
        }
    }
}

/// What a redraw did to the rendered slices
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RedrawSummary {
    pub entered: usize,
    pub updated: usize,
    pub exited: usize,
}

/// One slice as it appears at a given instant
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SliceFrame {
    /// Position in the mirror, `None` while the slice is leaving
    pub index: Option<usize>,
    pub id: ExpenseId,
    pub name: String,
    pub cost: u64,
    pub phase: Phase,
    pub angles: Angles,
    pub fill: Rgb,
    /// SVG path data relative to the donut centre
    pub path: String,
}

/// One legend row
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: Rgb,
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
}

/// Popup shown while a slice is hovered
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Tooltip {
    pub id: ExpenseId,
    pub name: String,
    pub cost: String,
    pub hint: String,
    pub x: f64,
    pub y: f64,
}

impl Tooltip {
    fn new(expense: &Expense, pointer: (f64, f64)) -> Self {
        Tooltip {
            id: expense.id.clone(),
            name: expense.name.clone(),
            cost: format!("${}", expense.cost),
            hint: "Click slice to delete".to_string(),
            x: pointer.0 + TOOLTIP_OFFSET.0,
            y: pointer.1 + TOOLTIP_OFFSET.1,
        }
    }
}

/// Everything needed to draw the chart at one instant
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub center: (f64, f64),
    pub outer_radius: f64,
    pub inner_radius: f64,
    pub slices: Vec<SliceFrame>,
    pub legend: Vec<LegendEntry>,
    pub tooltip: Option<Tooltip>,
    /// Whether any slice is still moving or fading
    pub animating: bool,
}

/// Animated donut chart
///
/// Slices are matched to the layout by position. On every redraw the slices
/// beyond the new layout leave, the ones within it morph to their new angles,
/// and any extra layout items enter. All three run for the same duration.
#[derive(Clone, Debug)]
pub struct PieChart {
    dims: Dimensions,
    shape: ArcShape,
    colors: ColorScale,
    transition: Duration,
    hover_transition: Duration,
    slices: Vec<RenderedSlice>,
    exiting: Vec<RenderedSlice>,
    hovered: Option<(usize, (f64, f64))>,
}

impl PieChart {
    pub fn new(config: &Config) -> Self {
        PieChart {
            dims: config.dims,
            shape: ArcShape::new(config.dims.radius, config.dims.inner_radius()),
            colors: ColorScale::default(),
            transition: config.transition,
            hover_transition: config.hover_transition,
            slices: Vec::new(),
            exiting: Vec::new(),
            hovered: None,
        }
    }

    pub fn dims(&self) -> Dimensions {
        self.dims
    }

    pub fn colors(&self) -> &ColorScale {
        &self.colors
    }

    /// Reconciles the rendered slices with a new snapshot of the records
    pub fn redraw(&mut self, expenses: &[Expense], now: Duration) -> RedrawSummary {
        self.prune(now);
        self.colors.set_domain(expenses.iter().map(|e| e.name.as_str()));

        let layout = pie_layout(expenses);
        let mut previous = mem::take(&mut self.slices).into_iter();
        let mut summary = RedrawSummary::default();

        for datum in layout {
            let slice = match previous.next() {
                Some(old) => {
                    summary.updated += 1;
                    RenderedSlice {
                        arc: ArcTween::update(old.arc.at(now), datum.angles, now, self.transition),
                        datum,
                        phase: Phase::Updating,
                        fill: old.fill,
                    }
                }
                None => {
                    summary.entered += 1;
                    RenderedSlice {
                        arc: ArcTween::enter(datum.angles, now, self.transition),
                        fill: FillTween::steady(self.colors.color(&datum.expense.name)),
                        datum,
                        phase: Phase::Entering,
                    }
                }
            };
            self.slices.push(slice);
        }

        for old in previous {
            summary.exited += 1;
            self.exiting.push(RenderedSlice {
                arc: ArcTween::exit(old.arc.at(now), now, self.transition),
                phase: Phase::Exiting,
                ..old
            });
        }

        if matches!(self.hovered, Some((index, _)) if index >= self.slices.len()) {
            self.hovered = None;
        }

        debug!(
            "Redraw: {} entering, {} updating, {} exiting",
            summary.entered, summary.updated, summary.exited
        );
        summary
    }

    /// Drops exiting slices whose animation has finished
    pub fn prune(&mut self, now: Duration) {
        self.exiting.retain(|s| !s.arc.is_finished(now));
    }

    /// Number of slices on the surface, leaving ones included
    pub fn rendered_count(&self, now: Duration) -> usize {
        self.slices.len() + self.exiting.iter().filter(|s| !s.arc.is_finished(now)).count()
    }

    /// Index of the live slice under a surface point
    pub fn slice_at(&self, x: f64, y: f64, now: Duration) -> Option<usize> {
        let (cx, cy) = self.dims.center();
        self.slices
            .iter()
            .position(|s| self.shape.contains(&s.arc.at(now), x - cx, y - cy))
    }

    /// Moves the pointer to a surface point
    ///
    /// Entering a slice fades it to the highlight color and returns its
    /// tooltip. Moving off every slice restores the previous one.
    pub fn hover(&mut self, x: f64, y: f64, now: Duration) -> Option<Tooltip> {
        let Some(index) = self.slice_at(x, y, now) else {
            self.leave(now);
            return None;
        };

        if self.hovered.map(|(current, _)| current) != Some(index) {
            self.leave(now);
            let slice = &mut self.slices[index];
            slice.fill = slice.fill.retarget(HIGHLIGHT, now, self.hover_transition);
        }
        self.hovered = Some((index, (x, y)));
        Some(Tooltip::new(&self.slices[index].datum.expense, (x, y)))
    }

    /// Pointer left the hovered slice: fade back to its scale color
    pub fn leave(&mut self, now: Duration) {
        if let Some((index, _)) = self.hovered.take() {
            if let Some(slice) = self.slices.get_mut(index) {
                let color = self.colors.color(&slice.datum.expense.name);
                slice.fill = slice.fill.retarget(color, now, self.hover_transition);
            }
        }
    }

    /// Record to delete for a click at a surface point
    ///
    /// The chart itself is left alone; the slice goes away once the store
    /// reports the removal and the chart is redrawn.
    pub fn click(&self, x: f64, y: f64, now: Duration) -> Option<ExpenseId> {
        self.slice_at(x, y, now)
            .map(|index| self.slices[index].datum.expense.id.clone())
    }

    pub fn tooltip(&self) -> Option<Tooltip> {
        self.hovered.and_then(|(index, pointer)| {
            self.slices
                .get(index)
                .map(|s| Tooltip::new(&s.datum.expense, pointer))
        })
    }

    pub fn legend(&self) -> Vec<LegendEntry> {
        let (x, y) = self.dims.legend_origin();
        let step = 2.0 * LEGEND_RADIUS + LEGEND_PADDING;
        self.colors
            .domain()
            .iter()
            .enumerate()
            .map(|(i, name)| LegendEntry {
                label: name.clone(),
                color: self.colors.color(name),
                cx: x,
                cy: y + i as f64 * step,
                radius: LEGEND_RADIUS,
            })
            .collect()
    }

    /// Evaluates every animation at `now`
    pub fn frame(&self, now: Duration) -> Frame {
        let live = self.slices.iter().enumerate().map(|(i, s)| (Some(i), s));
        let leaving = self
            .exiting
            .iter()
            .filter(|s| !s.arc.is_finished(now))
            .map(|s| (None, s));

        let slices: Vec<SliceFrame> = live
            .chain(leaving)
            .map(|(index, s)| {
                let angles = s.arc.at(now);
                SliceFrame {
                    index,
                    id: s.datum.expense.id.clone(),
                    name: s.datum.expense.name.clone(),
                    cost: s.datum.expense.cost,
                    phase: s.phase_at(now),
                    angles,
                    fill: s.fill.at(now),
                    path: self.shape.path(&angles),
                }
            })
            .collect();

        let animating = self
            .slices
            .iter()
            .chain(self.exiting.iter())
            .any(|s| !s.arc.is_finished(now) || !s.fill.is_finished(now));

        Frame {
            width: self.dims.surface().0,
            height: self.dims.surface().1,
            center: self.dims.center(),
            outer_radius: self.shape.outer_radius,
            inner_radius: self.shape.inner_radius,
            slices,
            legend: self.legend(),
            tooltip: self.tooltip(),
            animating,
        }
    }

    pub fn shape(&self) -> &ArcShape {
        &self.shape
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::SCHEME_SET3;
    use std::f64::consts::TAU;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn chart() -> PieChart {
        PieChart::new(&Config::default())
    }

    #[test]
    fn first_record_enters_as_a_full_ring() {
        let mut chart = chart();
        let summary = chart.redraw(&[Expense::new("1", "Coffee", 5)], ms(0));
        assert_eq!(summary, RedrawSummary { entered: 1, updated: 0, exited: 0 });

        let start = chart.frame(ms(0));
        assert_eq!(start.slices[0].phase, Phase::Entering);
        assert_eq!(start.slices[0].angles.span(), 0.0);
        assert!(start.animating);

        let end = chart.frame(ms(500));
        assert_eq!(end.slices.len(), 1);
        assert_eq!(end.slices[0].phase, Phase::Steady);
        assert!((end.slices[0].angles.span() - TAU).abs() < 1e-9);
        assert_eq!(end.slices[0].fill, SCHEME_SET3[0]);
        assert!(!end.animating);
    }

    #[test]
    fn shrinking_layout_exits_trailing_slices() {
        let mut chart = chart();
        chart.redraw(
            &[Expense::new("1", "A", 10), Expense::new("2", "B", 30)],
            ms(0),
        );
        let summary = chart.redraw(&[Expense::new("1", "A", 10)], ms(1000));
        assert_eq!(summary, RedrawSummary { entered: 0, updated: 1, exited: 1 });

        let mid = chart.frame(ms(1250));
        assert_eq!(mid.slices.len(), 2);
        assert_eq!(mid.slices[1].phase, Phase::Exiting);
        assert_eq!(mid.slices[1].index, None);

        let end = chart.frame(ms(1500));
        assert_eq!(end.slices.len(), 1);
        chart.prune(ms(1500));
        assert_eq!(chart.rendered_count(ms(1500)), 1);
    }

    #[test]
    fn exit_collapses_start_toward_end() {
        let mut chart = chart();
        chart.redraw(
            &[Expense::new("1", "A", 10), Expense::new("2", "B", 30)],
            ms(0),
        );
        chart.redraw(&[Expense::new("1", "A", 10)], ms(500));
        let leaving = chart.frame(ms(750)).slices[1].angles;
        assert!((leaving.end - TAU).abs() < 1e-9);
        assert!(leaving.start > TAU / 4.0 && leaving.start < TAU);
    }

    #[test]
    fn updated_slice_keeps_its_fill() {
        let mut chart = chart();
        chart.redraw(&[Expense::new("1", "A", 10), Expense::new("2", "B", 10)], ms(0));
        // "A" goes away; "B" now sits at position 0 where "A" was drawn
        chart.redraw(&[Expense::new("2", "B", 10)], ms(500));
        let frame = chart.frame(ms(1000));
        assert_eq!(frame.slices[0].name, "B");
        assert_eq!(frame.slices[0].fill, SCHEME_SET3[0]);
        assert_eq!(chart.colors().color("B"), SCHEME_SET3[0]);
    }

    #[test]
    fn update_interpolates_from_displayed_geometry() {
        let mut chart = chart();
        chart.redraw(&[Expense::new("1", "A", 10), Expense::new("2", "B", 30)], ms(0));
        chart.redraw(&[Expense::new("1", "A", 30), Expense::new("2", "B", 10)], ms(500));

        let at_start = chart.frame(ms(500));
        assert!((at_start.slices[0].angles.end - TAU / 4.0).abs() < 1e-9);
        let done = chart.frame(ms(1000));
        assert!((done.slices[0].angles.end - TAU * 3.0 / 4.0).abs() < 1e-9);
        assert_eq!(done.slices[1].phase, Phase::Steady);
    }

    #[test]
    fn hover_highlights_and_leave_restores() {
        let mut chart = chart();
        chart.redraw(&[Expense::new("1", "Coffee", 5)], ms(0));
        let (cx, cy) = chart.dims().center();

        let tip = chart.hover(cx + 100.0, cy, ms(500)).unwrap();
        assert_eq!(tip.name, "Coffee");
        assert_eq!(tip.cost, "$5");
        assert_eq!(tip.hint, "Click slice to delete");
        assert_eq!(chart.frame(ms(800)).slices[0].fill, HIGHLIGHT);
        assert!(chart.frame(ms(800)).tooltip.is_some());

        // Pointer in the donut hole is off every slice
        assert!(chart.hover(cx, cy, ms(800)).is_none());
        let frame = chart.frame(ms(1100));
        assert_eq!(frame.slices[0].fill, SCHEME_SET3[0]);
        assert!(frame.tooltip.is_none());
    }

    #[test]
    fn click_reports_id_without_touching_slices() {
        let mut chart = chart();
        chart.redraw(&[Expense::new("a", "Rent", 30), Expense::new("b", "Food", 10)], ms(0));
        let (cx, cy) = chart.dims().center();

        // Right of centre is angle TAU/4, inside "Rent" (0 .. 3/4 TAU)
        assert_eq!(chart.click(cx + 100.0, cy, ms(500)), Some(ExpenseId::new("a")));
        // Left of centre is angle 3/4 TAU, the start of "Food"
        assert_eq!(chart.click(cx - 100.0, cy - 1.0, ms(500)), Some(ExpenseId::new("b")));
        assert_eq!(chart.click(0.0, 0.0, ms(500)), None);
        assert_eq!(chart.frame(ms(500)).slices.len(), 2);
    }

    #[test]
    fn legend_lists_distinct_names() {
        let mut chart = chart();
        chart.redraw(
            &[
                Expense::new("1", "Food", 1),
                Expense::new("2", "Rent", 1),
                Expense::new("3", "Food", 1),
            ],
            ms(0),
        );
        let legend = chart.legend();
        assert_eq!(legend.len(), 2);
        assert_eq!(legend[0].label, "Food");
        assert_eq!((legend[0].cx, legend[0].cy), (340.0, 10.0));
        assert_eq!((legend[1].cx, legend[1].cy), (340.0, 40.0));
        assert_eq!(legend[1].color, SCHEME_SET3[1]);
    }

    #[test]
    fn hover_is_dropped_when_its_slice_leaves() {
        let mut chart = chart();
        chart.redraw(&[Expense::new("1", "A", 10), Expense::new("2", "B", 10)], ms(0));
        let (cx, cy) = chart.dims().center();
        assert!(chart.hover(cx - 100.0, cy + 1.0, ms(500)).is_some());
        chart.redraw(&[Expense::new("1", "A", 10)], ms(600));
        assert!(chart.tooltip().is_none());
    }
}
