#[derive(Debug, thiserror::Error)]
pub enum DiagramError {
    #[error("Malformed SVG: {0}")]
    Malformed(#[from] quick_xml::Error),

    #[error("Invalid SVG attribute: {0}")]
    Attribute(String),

    #[error("Root element is <{0}>, expected <svg>")]
    NotSvg(String),

    #[error("SVG document ends before its root element is closed")]
    Truncated,

    #[error("SVG document has no drawable paths")]
    NoStrokes,

    #[error("Stroke {stroke} lies outside the drawing area")]
    OutOfBounds { stroke: usize },
}
