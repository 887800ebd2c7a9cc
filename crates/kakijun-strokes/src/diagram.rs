use kurbo::{BezPath, ParamCurve, ParamCurveArclen, PathSeg, Point, Rect, Shape};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::DiagramError;

const ARCLEN_ACCURACY: f64 = 1e-3;

/// Upper bound on points sampled per path segment for one frame
const MAX_SAMPLES_PER_SEGMENT: usize = 256;

/// KanjiVG drawing area, used when the document declares nothing usable
const KANJIVG_VIEW_BOX: ViewBox = ViewBox {
    min_x: 0.0,
    min_y: 0.0,
    width: 109.0,
    height: 109.0,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    pub min_x: f64,
    pub min_y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewBox {
    /// Parse a `viewBox` attribute (`min-x min-y width height`, space or comma separated)
    pub fn parse(value: &str) -> Option<Self> {
        let numbers: Vec<f64> = value
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|part| !part.is_empty())
            .map(str::parse::<f64>)
            .collect::<Result<_, _>>()
            .ok()?;

        match numbers.as_slice() {
            &[min_x, min_y, width, height]
                if [min_x, min_y, width, height].iter().all(|v| v.is_finite())
                    && width > 0.0
                    && height > 0.0 =>
            {
                Some(Self {
                    min_x,
                    min_y,
                    width,
                    height,
                })
            }
            _ => None,
        }
    }

    /// Area a stroke may occupy: the view box grown by its own size on every side
    fn allowed_area(&self) -> Rect {
        Rect::new(
            self.min_x - self.width,
            self.min_y - self.height,
            self.min_x + 2.0 * self.width,
            self.min_y + 2.0 * self.height,
        )
    }

    /// Map a point in user units onto a `width` x `height` area, stretching to fill it
    pub fn map_to(&self, point: Point, width: f64, height: f64) -> Point {
        Point::new(
            (point.x - self.min_x) / self.width * width,
            (point.y - self.min_y) / self.height * height,
        )
    }
}

#[derive(Debug, Clone, Copy)]
struct MeasuredSegment {
    segment: PathSeg,
    length: f64,
}

/// One stroke of the diagram. Strokes are addressed by their position only.
#[derive(Debug, Clone)]
pub struct Stroke {
    index: usize,
    path: BezPath,
    segments: Vec<MeasuredSegment>,
    length: f64,
}

impl Stroke {
    fn new(index: usize, path: BezPath) -> Self {
        let segments: Vec<MeasuredSegment> = path
            .segments()
            .map(|segment| MeasuredSegment {
                segment,
                length: segment.arclen(ARCLEN_ACCURACY),
            })
            .collect();
        let length = segments.iter().map(|s| s.length).sum();

        Self {
            index,
            path,
            segments,
            length,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn path(&self) -> &BezPath {
        &self.path
    }

    /// Arc length, the dash offset at which the stroke is fully hidden
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Polylines covering the visible part of the stroke for a given dash offset.
    ///
    /// `step` is the maximum distance between two sampled points, in user units.
    pub fn visible_polylines(&self, dash_offset: f64, step: f64) -> Vec<Vec<Point>> {
        let revealed = (self.length - dash_offset).clamp(0.0, self.length);
        let step = step.max(0.1);
        let mut polylines: Vec<Vec<Point>> = Vec::new();

        if revealed <= 0.0 {
            return polylines;
        }

        let mut walked = 0.0;
        for measured in &self.segments {
            if walked >= revealed {
                break;
            }
            if measured.length <= 0.0 {
                continue;
            }

            let segment = measured.segment;
            let start = segment.eval(0.0);
            let continues = polylines
                .last()
                .and_then(|line| line.last())
                .is_some_and(|last| last.distance(start) < 1e-6);
            if !continues {
                polylines.push(vec![start]);
            }

            let visible = (revealed - walked).min(measured.length);
            let samples = (visible / step)
                .ceil()
                .clamp(1.0, MAX_SAMPLES_PER_SEGMENT as f64) as usize;
            if let Some(line) = polylines.last_mut() {
                for i in 1..=samples {
                    let arc = visible * i as f64 / samples as f64;
                    let t = if arc >= measured.length {
                        1.0
                    } else {
                        segment.inv_arclen(arc, ARCLEN_ACCURACY)
                    };
                    line.push(segment.eval(t));
                }
            }

            walked += measured.length;
        }

        polylines
    }
}

/// Strokes of one SVG document, in document order
#[derive(Debug, Clone)]
pub struct StrokeDiagram {
    view_box: ViewBox,
    strokes: Vec<Stroke>,
}

impl StrokeDiagram {
    /// Extract every drawable `<path>` of an SVG document.
    ///
    /// Document order is stroke order. Element ids and sizing attributes are
    /// dropped: the diagram is always drawn over the whole target area.
    pub fn parse(svg: &str) -> Result<Self, DiagramError> {
        let mut reader = Reader::from_str(svg);
        reader.config_mut().trim_text(true);

        let mut view_box = None;
        let mut strokes = Vec::new();
        let mut seen_root = false;
        let mut depth = 0usize;

        loop {
            match reader.read_event()? {
                Event::Eof => break,
                Event::Start(ref e) if !seen_root => {
                    view_box = open_root(e)?;
                    seen_root = true;
                    depth = 1;
                }
                Event::Empty(ref e) if !seen_root => {
                    view_box = open_root(e)?;
                    seen_root = true;
                }
                Event::Start(ref e) => {
                    depth += 1;
                    if e.local_name().as_ref() == b"path" {
                        let area = view_box.unwrap_or(KANJIVG_VIEW_BOX).allowed_area();
                        push_stroke(e, area, &mut strokes)?;
                    }
                }
                Event::Empty(ref e) => {
                    if e.local_name().as_ref() == b"path" {
                        let area = view_box.unwrap_or(KANJIVG_VIEW_BOX).allowed_area();
                        push_stroke(e, area, &mut strokes)?;
                    }
                }
                Event::End(_) => depth = depth.saturating_sub(1),
                _ => {}
            }
        }

        if !seen_root {
            return Err(DiagramError::NotSvg(String::new()));
        }
        if depth != 0 {
            return Err(DiagramError::Truncated);
        }
        if strokes.is_empty() {
            return Err(DiagramError::NoStrokes);
        }

        Ok(Self {
            view_box: view_box.unwrap_or(KANJIVG_VIEW_BOX),
            strokes,
        })
    }

    pub fn view_box(&self) -> ViewBox {
        self.view_box
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub fn total_length(&self) -> f64 {
        self.strokes.iter().map(Stroke::length).sum()
    }
}

fn open_root(root: &BytesStart) -> Result<Option<ViewBox>, DiagramError> {
    let name = String::from_utf8_lossy(root.local_name().as_ref()).into_owned();
    if name != "svg" {
        return Err(DiagramError::NotSvg(name));
    }

    let mut view_box = None;
    let mut width = None;
    let mut height = None;

    for attr in root.attributes() {
        let attr = attr.map_err(|e| DiagramError::Attribute(e.to_string()))?;
        let value = attr
            .unescape_value()
            .map_err(|e| DiagramError::Attribute(e.to_string()))?;
        match attr.key.local_name().as_ref() {
            b"viewBox" => view_box = ViewBox::parse(&value),
            b"width" => width = parse_length(&value),
            b"height" => height = parse_length(&value),
            _ => {}
        }
    }

    Ok(view_box.or_else(|| match (width, height) {
        (Some(width), Some(height)) => Some(ViewBox {
            min_x: 0.0,
            min_y: 0.0,
            width,
            height,
        }),
        _ => None,
    }))
}

/// Absolute length in user units; percentages and unknown units are ignored
fn parse_length(value: &str) -> Option<f64> {
    let value = value.trim();
    let number = value.strip_suffix("px").unwrap_or(value);
    number
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

/// Append the stroke of a `<path>`.
///
/// Paths reaching far outside `area`, or with non-finite coordinates, make
/// the whole document unusable.
fn push_stroke(
    element: &BytesStart,
    area: Rect,
    strokes: &mut Vec<Stroke>,
) -> Result<(), DiagramError> {
    let Some(attr) = element
        .try_get_attribute("d")
        .map_err(|e| DiagramError::Attribute(e.to_string()))?
    else {
        tracing::warn!("Skipping <path> without a 'd' attribute");
        return Ok(());
    };

    let d = attr
        .unescape_value()
        .map_err(|e| DiagramError::Attribute(e.to_string()))?;
    match BezPath::from_svg(d.trim()) {
        Ok(path) => {
            let index = strokes.len();
            if path.segments().next().is_none() {
                tracing::warn!("Skipping <path> without segments");
                return Ok(());
            }
            if !within(&path, area) {
                return Err(DiagramError::OutOfBounds { stroke: index + 1 });
            }

            let stroke = Stroke::new(index, path);
            if !stroke.length().is_finite() {
                return Err(DiagramError::OutOfBounds { stroke: index + 1 });
            }
            if stroke.length() > 0.0 {
                strokes.push(stroke);
            } else {
                tracing::warn!("Skipping zero-length <path>");
            }
        }
        Err(e) => tracing::warn!("Skipping <path> with invalid data: {}", e),
    }

    Ok(())
}

fn within(path: &BezPath, area: Rect) -> bool {
    let bounds = path.bounding_box();
    [bounds.x0, bounds.y0, bounds.x1, bounds.y1]
        .iter()
        .all(|v| v.is_finite())
        && bounds.x0 >= area.x0
        && bounds.y0 >= area.y0
        && bounds.x1 <= area.x1
        && bounds.y1 <= area.y1
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIZU: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.0//EN" "http://www.w3.org/TR/2001/REC-SVG-20010904/DTD/svg10.dtd" [
<!ATTLIST g
xmlns:kvg CDATA #FIXED "http://kanjivg.tagaini.net"
kvg:element CDATA #IMPLIED >
<!ATTLIST path
xmlns:kvg CDATA #FIXED "http://kanjivg.tagaini.net"
kvg:type CDATA #IMPLIED >
]>
<svg xmlns="http://www.w3.org/2000/svg" width="109" height="109" viewBox="0 0 109 109">
<g id="kvg:StrokePaths_06c34" style="fill:none;stroke:#000000;stroke-width:3;">
<g id="kvg:06c34" kvg:element="水">
	<path id="kvg:06c34-s1" kvg:type="㇚" d="M54.5,15.5c1,1,1.5,2.5,1.5,4.5c0,10,0,58,0,71c0,9-5,4-7,2.5"/>
	<path id="kvg:06c34-s2" kvg:type="㇇" d="M19.5,43.5c2,0.5,4,0.5,6,0c4-1,12.5-4,16.5-5c2.5-0.5,3.5,1,2.5,3.5C39,55,28,71.5,15.5,81"/>
	<path id="kvg:06c34-s3" kvg:type="㇒" d="M81.5,30.5c0.5,1.5,0,3-1,4c-3.5,3.5-9,8-17.5,12.5"/>
	<path id="kvg:06c34-s4" kvg:type="㇏" d="M58,44c5,10.5,18,30,24.5,36c2.5,2.5,5.5,4.5,9,5.5"/>
</g>
</g>
<g id="kvg:StrokeNumbers_06c34" style="font-size:8;fill:#808080">
	<text transform="matrix(1 0 0 1 48.50 14.50)">1</text>
</g>
</svg>"#;

    #[test]
    fn extracts_paths_in_document_order() {
        let diagram = StrokeDiagram::parse(MIZU).unwrap();

        assert_eq!(diagram.len(), 4);
        assert_eq!(
            diagram.view_box(),
            ViewBox {
                min_x: 0.0,
                min_y: 0.0,
                width: 109.0,
                height: 109.0
            }
        );
        for (i, stroke) in diagram.strokes().iter().enumerate() {
            assert_eq!(stroke.index(), i);
            assert!(stroke.length() > 0.0);
        }
    }

    #[test]
    fn straight_line_length() {
        let svg = r#"<svg viewBox="0 0 100 100"><path d="M10,10 L10,50"/></svg>"#;
        let diagram = StrokeDiagram::parse(svg).unwrap();

        assert!((diagram.strokes()[0].length() - 40.0).abs() < 1e-6);
        assert!((diagram.total_length() - 40.0).abs() < 1e-6);
    }

    #[test]
    fn skips_unusable_paths() {
        let svg = r#"<svg viewBox="0 0 100 100">
            <path/>
            <path d="not a path"/>
            <path d="M10,10 L60,10"></path>
        </svg>"#;
        let diagram = StrokeDiagram::parse(svg).unwrap();

        assert_eq!(diagram.len(), 1);
        assert_eq!(diagram.strokes()[0].index(), 0);
    }

    #[test]
    fn document_without_paths_is_rejected() {
        let svg = r#"<svg viewBox="0 0 109 109"><g><text>1</text></g></svg>"#;
        assert!(matches!(
            StrokeDiagram::parse(svg),
            Err(DiagramError::NoStrokes)
        ));
    }

    #[test]
    fn mismatched_tags_are_malformed() {
        let svg = r#"<svg><g><path d="M0,0 L1,1"/></svg>"#;
        assert!(matches!(
            StrokeDiagram::parse(svg),
            Err(DiagramError::Malformed(_))
        ));
    }

    #[test]
    fn unclosed_root_is_truncated() {
        let svg = r#"<svg><path d="M0,0 L1,1"/>"#;
        assert!(StrokeDiagram::parse(svg).is_err());
    }

    #[test]
    fn non_svg_root_is_rejected() {
        let svg = r#"<html><path d="M0,0 L1,1"/></html>"#;
        assert!(matches!(
            StrokeDiagram::parse(svg),
            Err(DiagramError::NotSvg(name)) if name == "html"
        ));
    }

    #[test]
    fn falls_back_to_width_and_height() {
        let svg = r#"<svg width="200px" height="100"><path d="M0,0 L10,0"/></svg>"#;
        let diagram = StrokeDiagram::parse(svg).unwrap();

        assert_eq!(diagram.view_box().width, 200.0);
        assert_eq!(diagram.view_box().height, 100.0);
    }

    #[test]
    fn defaults_to_kanjivg_view_box() {
        let svg = r#"<svg width="100%" height="100%"><path d="M0,0 L10,0"/></svg>"#;
        assert_eq!(StrokeDiagram::parse(svg).unwrap().view_box(), KANJIVG_VIEW_BOX);
    }

    #[test]
    fn view_box_parsing() {
        assert_eq!(
            ViewBox::parse("0,0, 109 109").map(|v| v.width),
            Some(109.0)
        );
        assert_eq!(ViewBox::parse("0 0 0 109"), None);
        assert_eq!(ViewBox::parse("0 0 109"), None);
        assert_eq!(ViewBox::parse("0 0 inf 109"), None);
        assert_eq!(ViewBox::parse("NaN 0 109 109"), None);
    }

    #[test]
    fn infinite_coordinates_are_rejected() {
        let svg = r#"<svg viewBox="0 0 109 109"><path d="M0,0 L1e400,0"/></svg>"#;
        assert!(matches!(
            StrokeDiagram::parse(svg),
            Err(DiagramError::OutOfBounds { stroke: 1 })
        ));
    }

    #[test]
    fn strokes_far_outside_the_view_box_are_rejected() {
        let svg = r#"<svg viewBox="0 0 109 109">
            <path d="M10,10 L90,10"/>
            <path d="M0,0 L100000000,0"/>
        </svg>"#;
        assert!(matches!(
            StrokeDiagram::parse(svg),
            Err(DiagramError::OutOfBounds { stroke: 2 })
        ));

        // A small overshoot past the edge is fine
        let svg = r#"<svg viewBox="0 0 109 109"><path d="M-5,50 L115,50"/></svg>"#;
        assert_eq!(StrokeDiagram::parse(svg).unwrap().len(), 1);
    }

    #[test]
    fn sampling_is_bounded_per_segment() {
        let svg = r#"<svg viewBox="0 0 100000 100000"><path d="M0,0 L100000,0"/></svg>"#;
        let diagram = StrokeDiagram::parse(svg).unwrap();

        let lines = diagram.strokes()[0].visible_polylines(0.0, 0.1);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), MAX_SAMPLES_PER_SEGMENT + 1);
        assert!((lines[0].last().unwrap().x - 100000.0).abs() < 1e-3);
    }

    #[test]
    fn view_box_stretches_to_target() {
        let view_box = ViewBox::parse("0 0 109 109").unwrap();
        let mapped = view_box.map_to(Point::new(54.5, 109.0), 20.0, 10.0);

        assert!((mapped.x - 10.0).abs() < 1e-9);
        assert!((mapped.y - 10.0).abs() < 1e-9);
    }

    #[test]
    fn visible_polylines_follow_dash_offset() {
        let svg = r#"<svg viewBox="0 0 100 100"><path d="M0,0 L40,0"/></svg>"#;
        let diagram = StrokeDiagram::parse(svg).unwrap();
        let stroke = &diagram.strokes()[0];

        assert!(stroke.visible_polylines(stroke.length(), 5.0).is_empty());

        let half = stroke.visible_polylines(20.0, 5.0);
        assert_eq!(half.len(), 1);
        let end = *half[0].last().unwrap();
        assert!((end.x - 20.0).abs() < 1e-3);

        let full = stroke.visible_polylines(0.0, 5.0);
        let end = *full[0].last().unwrap();
        assert!((end.x - 40.0).abs() < 1e-3);
    }

    #[test]
    fn disjoint_subpaths_are_separate_polylines() {
        let svg = r#"<svg viewBox="0 0 100 100"><path d="M0,0 L10,0 M50,50 L60,50"/></svg>"#;
        let diagram = StrokeDiagram::parse(svg).unwrap();

        let lines = diagram.strokes()[0].visible_polylines(0.0, 5.0);
        assert_eq!(lines.len(), 2);
    }
}
