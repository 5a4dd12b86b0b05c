use std::f64::consts::PI;
use std::fmt::Write;

use html_escape::encode_text;

use crate::config::ChartConfig;

const SIZE: f64 = 480.0;
const CENTER_X: f64 = 240.0;
const CENTER_Y: f64 = 260.0;
const RADIUS: f64 = 160.0;
const RINGS: usize = 5;

/// Radar chart over named axes.
#[derive(Debug, Clone, PartialEq)]
pub struct SpiderChart {
    pub title: String,
    pub name: String,
    pub max_value: f64,
    pub axes: Vec<(String, f64)>,
}

impl From<&ChartConfig> for SpiderChart {
    fn from(cfg: &ChartConfig) -> Self {
        Self {
            title: cfg.title.clone(),
            name: cfg.name.clone(),
            max_value: cfg.max_value,
            axes: cfg
                .axes
                .iter()
                .map(|a| (a.label.clone(), a.value))
                .collect(),
        }
    }
}

impl SpiderChart {
    pub fn validate(&self) -> Result<(), String> {
        if self.axes.len() < 3 {
            return Err(format!(
                "chart '{}' needs at least 3 axes, got {}",
                self.name,
                self.axes.len()
            ));
        }
        if !(self.max_value.is_finite() && self.max_value > 0.0) {
            return Err(format!("chart '{}' has invalid max value", self.name));
        }
        if let Some((label, value)) = self
            .axes
            .iter()
            .find(|(_, v)| !v.is_finite() || *v < 0.0 || *v > self.max_value)
        {
            return Err(format!(
                "chart '{}' axis '{label}' value {value} outside 0..={}",
                self.name, self.max_value
            ));
        }
        Ok(())
    }

    pub fn to_svg(&self) -> Result<String, String> {
        self.validate()?;
        let n = self.axes.len();
        let point = |i: usize, fraction: f64| {
            let angle = -PI / 2.0 + 2.0 * PI * i as f64 / n as f64;
            (
                CENTER_X + RADIUS * fraction * angle.cos(),
                CENTER_Y + RADIUS * fraction * angle.sin(),
            )
        };
        let polygon = |points: Vec<(f64, f64)>| {
            points
                .iter()
                .map(|(x, y)| format!("{x:.1},{y:.1}"))
                .collect::<Vec<_>>()
                .join(" ")
        };

        let mut svg = String::new();
        let _ = writeln!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{SIZE}\" height=\"{SIZE}\" viewBox=\"0 0 {SIZE} {SIZE}\" font-family=\"sans-serif\">"
        );
        let _ = writeln!(
            svg,
            "<text x=\"{CENTER_X}\" y=\"28\" text-anchor=\"middle\" font-size=\"18\" font-weight=\"bold\">{}</text>",
            encode_text(&self.title)
        );

        for ring in 1..=RINGS {
            let fraction = ring as f64 / RINGS as f64;
            let ring_points = (0..n).map(|i| point(i, fraction)).collect();
            let _ = writeln!(
                svg,
                "<polygon points=\"{}\" fill=\"none\" stroke=\"#cccccc\"/>",
                polygon(ring_points)
            );
        }

        for (i, (label, _)) in self.axes.iter().enumerate() {
            let (x, y) = point(i, 1.0);
            let _ = writeln!(
                svg,
                "<line x1=\"{CENTER_X}\" y1=\"{CENTER_Y}\" x2=\"{x:.1}\" y2=\"{y:.1}\" stroke=\"#cccccc\"/>"
            );
            let (lx, ly) = point(i, 1.15);
            let anchor = if (lx - CENTER_X).abs() < 1.0 {
                "middle"
            } else if lx > CENTER_X {
                "start"
            } else {
                "end"
            };
            let _ = writeln!(
                svg,
                "<text x=\"{lx:.1}\" y=\"{ly:.1}\" text-anchor=\"{anchor}\" font-size=\"13\">{}</text>",
                encode_text(label)
            );
        }

        let data_points = self
            .axes
            .iter()
            .enumerate()
            .map(|(i, (_, v))| point(i, v / self.max_value))
            .collect();
        let _ = writeln!(
            svg,
            "<polygon points=\"{}\" fill=\"#1f77b4\" fill-opacity=\"0.35\" stroke=\"#1f77b4\" stroke-width=\"2\"/>",
            polygon(data_points)
        );
        svg.push_str("</svg>\n");
        Ok(svg)
    }
}
