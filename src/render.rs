#![cfg(feature = "web")]
use plotters::coord::Shift;
use plotters::prelude::*;
use std::io::Cursor;

use crate::arc::ArcShape;
use crate::chart::{Frame, STROKE, STROKE_WIDTH};
use crate::color::Rgb;
use crate::error::RenderError;

/// Background of rasterised frames; SVG frames stay transparent
const BACKGROUND: RGBColor = RGBColor(0x33, 0x33, 0x33);

const TOOLTIP_SIZE: (i32, i32) = (150, 64);
const TOOLTIP_FILL: RGBColor = RGBColor(0x42, 0x42, 0x42);

fn color(rgb: Rgb) -> RGBColor {
    RGBColor(rgb.0, rgb.1, rgb.2)
}

fn drawing<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Drawing(e.to_string())
}

fn pixel((x, y): (f64, f64)) -> (i32, i32) {
    (x.round() as i32, y.round() as i32)
}

/// Renders a chart frame as an SVG document
pub fn render_svg(frame: &Frame) -> Result<String, RenderError> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (frame.width, frame.height))
            .into_drawing_area();
        draw_frame(&root, frame)?;
        root.present().map_err(drawing)?;
    }
    Ok(svg)
}

/// Renders a chart frame as a PNG image
pub fn render_png(frame: &Frame) -> Result<Vec<u8>, RenderError> {
    let (width, height) = (frame.width, frame.height);
    let mut buffer = vec![0u8; (width * height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&BACKGROUND).map_err(drawing)?;
        draw_frame(&root, frame)?;
        root.present().map_err(drawing)?;
    }

    let image = image::RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| RenderError::Encoding("Frame buffer has the wrong size".to_string()))?;
    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), image::ImageOutputFormat::Png)
        .map_err(|e| RenderError::Encoding(e.to_string()))?;
    Ok(png)
}

fn draw_frame<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    frame: &Frame,
) -> Result<(), RenderError> {
    let shape = ArcShape::new(frame.outer_radius, frame.inner_radius);

    for slice in &frame.slices {
        if slice.angles.span().abs() < f64::EPSILON {
            continue;
        }
        let points: Vec<(i32, i32)> = shape
            .polygon(&slice.angles, frame.center)
            .into_iter()
            .map(pixel)
            .collect();

        root.draw(&Polygon::new(points.clone(), color(slice.fill).filled()))
            .map_err(drawing)?;

        let mut outline = points;
        if let Some(first) = outline.first().copied() {
            outline.push(first);
        }
        root.draw(&PathElement::new(
            outline,
            color(STROKE).stroke_width(STROKE_WIDTH),
        ))
        .map_err(drawing)?;
    }

    for entry in &frame.legend {
        let center = pixel((entry.cx, entry.cy));
        root.draw(&Circle::new(
            center,
            entry.radius.round() as i32,
            color(entry.color).filled(),
        ))
        .map_err(drawing)?;
        let label_at = pixel((entry.cx + entry.radius + 10.0, entry.cy - 7.0));
        root.draw(&Text::new(
            entry.label.clone(),
            label_at,
            ("sans-serif", 14).into_font().color(&WHITE),
        ))
        .map_err(drawing)?;
    }

    if let Some(tip) = &frame.tooltip {
        let (x, y) = pixel((tip.x, tip.y));
        root.draw(&Rectangle::new(
            [(x, y), (x + TOOLTIP_SIZE.0, y + TOOLTIP_SIZE.1)],
            TOOLTIP_FILL.filled(),
        ))
        .map_err(drawing)?;
        for (i, line) in [&tip.name, &tip.cost, &tip.hint].into_iter().enumerate() {
            root.draw(&Text::new(
                line.clone(),
                (x + 8, y + 6 + 18 * i as i32),
                ("sans-serif", 13).into_font().color(&WHITE),
            ))
            .map_err(drawing)?;
        }
    }

    Ok(())
}
