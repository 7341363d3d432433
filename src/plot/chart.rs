//! Drawing with plotters onto any backend (bitmap, SVG file, SVG string).

use crate::plot::{Chart, Y_LABEL, time_label};
use anyhow::bail;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;

const INFO_GREEN: RGBColor = RGBColor(0, 128, 0);
const CALLOUT_FILL: RGBColor = RGBColor(204, 204, 204);

/// Render `chart` into `root` and flush it.
pub fn draw<DB>(root: DrawingArea<DB, Shift>, chart: &Chart) -> anyhow::Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let s = &chart.series;
    let scale = chart.scale;
    let Some(avg_times) = s.avg_times() else {
        bail!("no points to plot");
    };
    let (x0, x1) = chart.x_range();
    let (y0, y1) = chart.y_range();

    root.fill(&WHITE)?;

    let mut cc = ChartBuilder::on(&root)
        .caption(&chart.title, ("sans-serif", 20))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x0..x1, (y0..y1).with_key_points(scale.key_points(y0, y1)))?;

    cc.configure_mesh()
        .x_desc(chart.x_label.as_str())
        .y_desc(Y_LABEL)
        .x_label_formatter(&|x| time_label(*x))
        .y_label_formatter(&|u| scale.tick_label(*u))
        .draw()?;

    let line = |values: &[i64]| -> Vec<(f64, f64)> {
        s.t.iter()
            .zip(values)
            .map(|(&t, &v)| (t as f64, scale.forward(v as f64)))
            .collect()
    };
    let flat = |y: f64| -> Vec<(f64, f64)> {
        avg_times.iter().map(|&t| (t, scale.forward(y))).collect()
    };

    cc.draw_series(DashedLineSeries::new(line(&s.wssi), 8, 4, RED.stroke_width(2)))?
        .label("insn")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));

    if let Some(avg) = chart.avg_insn {
        let pts = flat(avg);
        cc.draw_series(DashedLineSeries::new(pts.clone(), 6, 4, BLACK.stroke_width(1)))?
            .label("insn-avg")
            .legend(|(x, y)| {
                EmptyElement::at((x, y))
                    + PathElement::new(vec![(0, 0), (20, 0)], BLACK.stroke_width(1))
                    + Cross::new((10, 0), 4, BLACK.stroke_width(1))
            });
        cc.draw_series(pts.into_iter().map(|p| Cross::new(p, 5, BLACK.stroke_width(1))))?;
    }

    cc.draw_series(LineSeries::new(line(&s.wssd), BLUE.stroke_width(2)))?
        .label("data")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(2)));

    if let Some(avg) = chart.avg_data {
        let pts = flat(avg);
        cc.draw_series(DashedLineSeries::new(pts.clone(), 6, 4, BLACK.stroke_width(1)))?
            .label("data-avg")
            .legend(|(x, y)| {
                EmptyElement::at((x, y))
                    + PathElement::new(vec![(0, 0), (20, 0)], BLACK.stroke_width(1))
                    + Circle::new((10, 0), 3, BLACK.stroke_width(1))
            });
        cc.draw_series(pts.into_iter().map(|p| Circle::new(p, 4, BLACK.stroke_width(1))))?;
    }

    let zero = scale.forward(0.0);

    if let Some(tau) = chart.tau {
        let pts = vec![(0.0, zero), (tau as f64, zero)];
        cc.draw_series(LineSeries::new(pts.clone(), MAGENTA.stroke_width(2)))?
            .label("τ length")
            .legend(|(x, y)| {
                EmptyElement::at((x, y))
                    + PathElement::new(vec![(0, 0), (20, 0)], MAGENTA.stroke_width(2))
                    + TriangleMarker::new((10, 0), 4, MAGENTA.filled())
            });
        cc.draw_series(pts.into_iter().map(|p| TriangleMarker::new(p, 5, MAGENTA.filled())))?;
    }

    // Event guides span the full height; callouts hang just below y=0.
    for &t in s.events.keys() {
        let x = t as f64;
        let guide = vec![(x, y0), (x, y1)];
        cc.draw_series(DashedLineSeries::new(guide, 2, 3, INFO_GREEN.stroke_width(1)))?;
    }
    cc.draw_series(s.events.iter().map(|(&t, &id)| {
        let label = id.to_string();
        let half = 4 * label.len() as i32 + 5;
        let corners = [(-half, 8), (half, 26)];
        EmptyElement::at((t as f64, zero))
            + Rectangle::new(corners, CALLOUT_FILL.filled())
            + Rectangle::new(corners, INFO_GREEN.stroke_width(1))
            + Text::new(
                label,
                (-half + 5, 11),
                ("sans-serif", 13).into_font().color(&INFO_GREEN),
            )
    }))?;

    cc.configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Render `chart` as an SVG document held in memory.
pub fn render_svg(chart: &Chart, size: (u32, u32)) -> anyhow::Result<String> {
    let mut svg = String::new();
    draw(SVGBackend::with_string(&mut svg, size).into_drawing_area(), chart)?;
    Ok(svg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::{FigSize, Output, PlotOptions, YScale};
    use crate::report::row::MetaValue;
    use crate::report::{Report, WsPoint};

    fn report(tau: i64, events: bool) -> Report {
        let info = |id| if events { Some(id) } else { None };
        let mut r = Report::default();
        r.meta.insert("Tau".into(), MetaValue::Int(Some(tau)));
        r.meta.insert("Time Unit".into(), MetaValue::Text("instructions".into()));
        r.points = vec![
            WsPoint {
                t: 100,
                wssi: 10,
                wssd: 40,
                info: info(4242),
            },
            WsPoint {
                t: 200,
                wssi: 1200,
                wssd: 9000,
                info: None,
            },
            WsPoint {
                t: 300,
                wssi: 30,
                wssd: 60,
                info: info(7373),
            },
        ];
        r
    }

    fn svg(report: &Report, yscale: YScale) -> String {
        let opts = PlotOptions {
            yscale,
            figsize: FigSize::default(),
            title: None,
            output: Output::Show,
        };
        render_svg(&Chart::new(report, &opts), opts.figsize.pixels()).unwrap()
    }

    fn text_at(svg: &str, label: &str) -> Option<usize> {
        svg.find(&format!(">{}</text>", label))
    }

    #[test]
    fn legend_lists_series_in_drawing_order() {
        let svg = svg(&report(50, false), YScale::Linear);
        let order: Vec<usize> = ["insn", "insn-avg", "data", "data-avg", "τ length"]
            .iter()
            .map(|label| text_at(&svg, label).unwrap_or_else(|| panic!("no {:?}", label)))
            .collect();
        assert!(order.windows(2).all(|w| w[0] < w[1]), "{:?}", order);
    }

    #[test]
    fn tau_marker_only_for_nonzero_tau() {
        let svg = svg(&report(0, false), YScale::Linear);
        assert!(text_at(&svg, "data-avg").is_some());
        assert!(text_at(&svg, "τ length").is_none());
    }

    #[test]
    fn event_ids_are_drawn() {
        let with = svg(&report(50, true), YScale::Linear);
        assert!(text_at(&with, "4242").is_some());
        assert!(text_at(&with, "7373").is_some());

        let without = svg(&report(50, false), YScale::Linear);
        assert!(text_at(&without, "4242").is_none());
    }

    #[test]
    fn axis_labels_and_title() {
        let svg = svg(&report(1500, false), YScale::Linear);
        assert!(text_at(&svg, Y_LABEL).is_some());
        assert!(text_at(&svg, "time [instructions]").is_some());
        assert!(text_at(&svg, "Working set size with τ=1,500").is_some());
        assert!(text_at(&svg, "200").is_some());
        assert!(text_at(&svg, "200.0").is_none());
    }

    #[test]
    fn log_axis_labels_decades() {
        let svg = svg(&report(50, false), YScale::Log);
        for decade in ["1", "10", "100", "1000"] {
            assert!(text_at(&svg, decade).is_some(), "missing {}", decade);
        }
        assert!(text_at(&svg, "3.16").is_none());
    }

    #[test]
    fn empty_series_is_an_error() {
        let opts = PlotOptions {
            yscale: YScale::Linear,
            figsize: FigSize::default(),
            title: None,
            output: Output::Show,
        };
        let chart = Chart::new(&Report::default(), &opts);
        assert!(render_svg(&chart, (100, 100)).is_err());
    }
}
