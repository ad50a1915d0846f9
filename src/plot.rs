use std::io::Cursor;

use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use plotters::prelude::*;

use crate::error::BciError;
use crate::groups::{ChartGroupSpec, MarkerStyle};
use crate::matrix::SampleMatrix;

#[derive(Clone, Debug)]
pub struct RenderStyle {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    pub palette: Vec<RGBColor>,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            width: 900,
            height: 400,
            background: RGBColor(10, 10, 10),
            palette: vec![BLUE, RED, GREEN, CYAN, MAGENTA, YELLOW, WHITE],
        }
    }
}

/// Renders one chart group as a PNG: the matrix rows listed in `indices`
/// as line series, annotated with the group's axis titles and markers.
///
/// A group flagged three-dimensional with exactly three member channels is
/// drawn as an X/Y/Z trajectory instead of per-channel time series.
pub fn render_group_png(
    matrix: &SampleMatrix,
    labels: &[String],
    indices: &[usize],
    spec: &ChartGroupSpec,
    style: &RenderStyle,
) -> Result<Vec<u8>, BciError> {
    if indices.is_empty() {
        return Err(BciError::Plot(format!("group {:?} matched no channels", spec.name)));
    }
    if let Some(&bad) = indices.iter().find(|&&i| i >= matrix.num_rows()) {
        return Err(BciError::Plot(format!(
            "group {:?} references row {bad} outside the {}-row matrix",
            spec.name,
            matrix.num_rows()
        )));
    }
    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        if spec.three_dimensional && indices.len() == 3 {
            draw_trajectory(&root, matrix, indices, spec, style)?;
        } else {
            draw_time_series(&root, matrix, labels, indices, spec, style)?;
        }
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}

fn draw_time_series<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    matrix: &SampleMatrix,
    labels: &[String],
    indices: &[usize],
    spec: &ChartGroupSpec,
    style: &RenderStyle,
) -> Result<(), BciError>
where
    DB::ErrorType: 'static,
{
    let sample_count = matrix.sample_count();
    let (y_min, y_max) = value_bounds(matrix, indices);
    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .caption(&spec.name, ("sans-serif", 20).into_font().color(&WHITE))
        .set_label_area_size(LabelAreaPosition::Left, 50)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(0f64..sample_count.max(1) as f64, y_min..y_max)?;
    chart
        .configure_mesh()
        .x_desc(&spec.x_axis_title)
        .y_desc(&spec.y_axis_title)
        .axis_desc_style(("sans-serif", 14).into_font().color(&WHITE))
        .label_style(("sans-serif", 12).into_font().color(&WHITE))
        .light_line_style(WHITE.mix(0.1))
        .draw()?;
    for (position, &row) in indices.iter().enumerate() {
        let color = style.palette[position % style.palette.len()];
        let samples = matrix.row(row);
        let series = samples.iter().enumerate().map(|(i, v)| (i as f64, *v));
        chart
            .draw_series(LineSeries::new(series, &color))?
            .label(
                labels
                    .get(row)
                    .cloned()
                    .unwrap_or_else(|| format!("Ch {row}")),
            )
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        match spec.marker {
            MarkerStyle::None => {}
            MarkerStyle::Dot => {
                chart.draw_series(samples.iter().enumerate().map(|(i, v)| {
                    Circle::new((i as f64, *v), 2, color.filled())
                }))?;
            }
            MarkerStyle::Circle => {
                chart.draw_series(samples.iter().enumerate().map(|(i, v)| {
                    Circle::new((i as f64, *v), 3, color.stroke_width(1))
                }))?;
            }
            MarkerStyle::Square => {
                chart.draw_series(samples.iter().enumerate().map(|(i, v)| {
                    Rectangle::new([(i as f64 - 0.2, *v), (i as f64 + 0.2, *v)], color.filled())
                }))?;
            }
        }
    }
    chart
        .configure_series_labels()
        .border_style(WHITE.mix(0.2))
        .background_style(style.background)
        .label_font(("sans-serif", 12).into_font().color(&WHITE))
        .draw()?;
    Ok(())
}

fn draw_trajectory<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    matrix: &SampleMatrix,
    indices: &[usize],
    spec: &ChartGroupSpec,
    style: &RenderStyle,
) -> Result<(), BciError>
where
    DB::ErrorType: 'static,
{
    let (x_row, y_row, z_row) = (indices[0], indices[1], indices[2]);
    let bound = indices
        .iter()
        .flat_map(|&row| matrix.row(row).iter().copied())
        .fold(0.0f64, |acc, v| acc.max(v.abs()))
        .max(1e-3);
    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .caption(&spec.name, ("sans-serif", 20).into_font().color(&WHITE))
        .build_cartesian_3d(-bound..bound, -bound..bound, -bound..bound)?;
    chart
        .configure_axes()
        .label_style(("sans-serif", 12).into_font().color(&WHITE))
        .draw()?;
    let color = style.palette[0];
    let points = (0..matrix.sample_count()).map(|i| {
        (
            matrix.row(x_row)[i],
            matrix.row(y_row)[i],
            matrix.row(z_row)[i],
        )
    });
    chart.draw_series(LineSeries::new(points, &color))?;
    Ok(())
}

fn value_bounds(matrix: &SampleMatrix, indices: &[usize]) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &row in indices {
        for &v in matrix.row(row) {
            min = min.min(v);
            max = max.max(v);
        }
    }
    if !min.is_finite() || !max.is_finite() || (max - min).abs() < f64::EPSILON {
        (-50.0, 50.0)
    } else {
        (min, max)
    }
}

fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, BciError> {
    let image: ImageBuffer<Rgb<u8>, _> = ImageBuffer::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| BciError::Plot("render buffer has the wrong size".into()))?;
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}
