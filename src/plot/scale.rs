//! Y-axis scales.
//!
//! The chart is always drawn on a linear coordinate system; non-linear
//! scales transform the plotted values, place ticks on round data values and
//! print tick labels back in data units.

use clap::ValueEnum;
use plotters::coord::ranged1d::Ranged;
use plotters::coord::types::RangedCoordf64;

/// Smallest value shown on a log axis; non-positive sizes are clamped to it.
const LOG_FLOOR: f64 = 0.1;

/// Half-width of the linear region around zero on a symlog axis.
const LINTHRESH: f64 = 2.0;

/// Tick count requested from plotters for linear axes.
const LINEAR_TICKS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum YScale {
    #[default]
    Linear,
    Symlog,
    Log,
}

impl YScale {
    /// Data value -> axis position.
    pub fn forward(self, v: f64) -> f64 {
        match self {
            YScale::Linear => v,
            YScale::Log => v.max(LOG_FLOOR).log10(),
            YScale::Symlog => v.signum() * (1.0 + v.abs() / LINTHRESH).log10(),
        }
    }

    /// Axis position -> data value.
    pub fn inverse(self, u: f64) -> f64 {
        match self {
            YScale::Linear => u,
            YScale::Log => 10f64.powf(u),
            YScale::Symlog => u.signum() * LINTHRESH * (10f64.powf(u.abs()) - 1.0),
        }
    }

    /// Tick positions (axis coordinates) within `lo..=hi`.
    ///
    /// Log ticks sit on decades (adding 2x and 5x steps for short ranges),
    /// symlog ticks on 0 and powers of ten. Falls back to linear ticks when
    /// fewer than two round values fit.
    pub fn key_points(self, lo: f64, hi: f64) -> Vec<f64> {
        let inside = |u: &f64| *u >= lo && *u <= hi;
        let ticks: Vec<f64> = match self {
            YScale::Linear => Vec::new(),
            YScale::Log => {
                let decades: Vec<f64> = (lo.ceil() as i32..=hi.floor() as i32)
                    .map(f64::from)
                    .collect();
                if decades.len() >= 2 {
                    decades
                } else {
                    (lo.floor() as i32..=hi.ceil() as i32)
                        .flat_map(|k| [1.0, 2.0, 5.0].map(|m: f64| m.log10() + f64::from(k)))
                        .filter(inside)
                        .collect()
                }
            }
            YScale::Symlog => {
                let mut values = vec![0.0];
                for k in 0..=18 {
                    let p = 10f64.powi(k);
                    values.extend([-p, p]);
                }
                let mut ticks: Vec<f64> = values
                    .into_iter()
                    .map(|v| self.forward(v))
                    .filter(inside)
                    .collect();
                ticks.sort_by(f64::total_cmp);
                ticks
            }
        };

        if ticks.len() >= 2 {
            ticks
        } else {
            RangedCoordf64::from(lo..hi).key_points(LINEAR_TICKS)
        }
    }

    pub fn tick_label(self, u: f64) -> String {
        let v = self.inverse(u);
        let r = v.round();
        if (v - r).abs() <= 1e-6 * v.abs().max(1.0) {
            format!("{}", r as i64)
        } else if v.abs() >= 100.0 {
            format!("{:.0}", v)
        } else {
            format!("{:.2}", v)
        }
    }
}
