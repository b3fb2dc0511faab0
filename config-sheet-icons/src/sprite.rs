//! SVG sprite sheets: many icons packed as `<symbol>` elements in one file.

use config_sheet_core::Icon;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// Suffix appended to icon names to form symbol ids.
pub const SYMBOL_SUFFIX: &str = "-100px";

const DEFAULT_VIEW_BOX: &str = "0 0 100 100";
const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// The pieces of a standalone `<svg>` document needed to re-wrap it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvgParts {
    pub view_box: String,
    pub inner: String,
}

fn attr(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes()
        .with_checks(false)
        .flatten()
        .find(|a| a.key.as_ref() == name)
        .map(|a| String::from_utf8_lossy(a.value.as_ref()).into_owned())
}

fn view_box_of(e: &BytesStart<'_>) -> String {
    if let Some(vb) = attr(e, b"viewBox") {
        return vb;
    }
    let dim = |name| {
        attr(e, name).and_then(|v| {
            v.trim_end_matches("px")
                .trim()
                .parse::<f64>()
                .ok()
        })
    };
    match (dim(b"width"), dim(b"height")) {
        (Some(w), Some(h)) => format!("0 0 {w} {h}"),
        _ => DEFAULT_VIEW_BOX.to_string(),
    }
}

/// Split an `<svg>` document into its view box and inner markup.
pub fn parse_svg(svg: &str) -> Result<SvgParts, quick_xml::Error> {
    let mut reader = Reader::from_str(svg);
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"svg" => {
                let view_box = view_box_of(&e);
                let e = e.into_owned();
                let span = reader.read_to_end(e.name())?;
                let inner = svg
                    .get(span.start as usize..span.end as usize)
                    .unwrap_or_default()
                    .trim()
                    .to_string();
                return Ok(SvgParts { view_box, inner });
            }
            Event::Empty(e) if e.local_name().as_ref() == b"svg" => {
                return Ok(SvgParts {
                    view_box: view_box_of(&e),
                    inner: String::new(),
                });
            }
            Event::Eof => {
                return Ok(SvgParts {
                    view_box: DEFAULT_VIEW_BOX.to_string(),
                    inner: svg.trim().to_string(),
                });
            }
            _ => {}
        }
    }
}

/// Pack inline SVG icons into one sprite. Icons whose markup does not parse
/// are returned by name in the second element.
pub fn build_sprite<'a>(icons: impl IntoIterator<Item = &'a Icon>) -> (String, Vec<String>) {
    let mut out = format!(r#"<svg xmlns="{SVG_NS}">"#);
    let mut failed = Vec::new();
    for icon in icons {
        match parse_svg(&icon.svg) {
            Ok(parts) => {
                out.push_str(&format!(
                    r#"<symbol id="{}{SYMBOL_SUFFIX}" viewBox="{}">{}</symbol>"#,
                    icon.name, parts.view_box, parts.inner
                ));
            }
            Err(e) => {
                log::debug!("Unparseable SVG for icon '{}': {e}", icon.name);
                failed.push(icon.name.clone());
            }
        }
    }
    out.push_str("</svg>");
    (out, failed)
}

/// Icon name for a symbol id: strips a trailing `-<n>px` size marker.
pub fn icon_name_from_symbol_id(id: &str) -> &str {
    if let Some((name, size)) = id.rsplit_once('-')
        && let Some(digits) = size.strip_suffix("px")
        && !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit())
        && !name.is_empty()
    {
        return name;
    }
    id
}

/// Unpack a sprite into standalone SVG icons, one per `<symbol>` with an id.
pub fn parse_sprite(sprite: &str) -> Result<Vec<Icon>, quick_xml::Error> {
    let mut reader = Reader::from_str(sprite);
    let mut icons = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"symbol" => {
                let id = attr(&e, b"id");
                let view_box = attr(&e, b"viewBox").unwrap_or_else(|| DEFAULT_VIEW_BOX.to_string());
                let e = e.into_owned();
                let span = reader.read_to_end(e.name())?;
                let inner = sprite
                    .get(span.start as usize..span.end as usize)
                    .unwrap_or_default();
                if let Some(id) = id {
                    icons.push(Icon::new(
                        icon_name_from_symbol_id(&id),
                        format!(
                            r#"<svg xmlns="{SVG_NS}" viewBox="{view_box}">{}</svg>"#,
                            inner.trim()
                        ),
                    ));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(icons)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_svg_reads_view_box_and_inner() {
        let parts =
            parse_svg(r#"<?xml version="1.0"?><svg viewBox="0 0 24 24"><path d="M0 0h24"/></svg>"#)
                .unwrap();
        assert_eq!(parts.view_box, "0 0 24 24");
        assert_eq!(parts.inner, r#"<path d="M0 0h24"/>"#);
    }

    #[test]
    fn view_box_falls_back_to_dimensions() {
        let parts = parse_svg(r#"<svg width="48px" height="32"><g/></svg>"#).unwrap();
        assert_eq!(parts.view_box, "0 0 48 32");
    }

    #[test]
    fn sprite_round_trips_icons() {
        let icons = vec![
            Icon::new("river", r#"<svg viewBox="0 0 10 10"><circle r="4"/></svg>"#),
            Icon::new("animal", r#"<svg viewBox="0 0 20 20"><rect width="2"/></svg>"#),
        ];
        let (sprite, failed) = build_sprite(&icons);
        assert!(failed.is_empty());
        assert!(sprite.contains(r#"<symbol id="river-100px" viewBox="0 0 10 10">"#));

        let parsed = parse_sprite(&sprite).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].name, "river");
        assert_eq!(parse_svg(&parsed[1].svg).unwrap().inner, r#"<rect width="2"/>"#);
    }

    #[test]
    fn symbol_id_suffixes() {
        assert_eq!(icon_name_from_symbol_id("river-100px"), "river");
        assert_eq!(icon_name_from_symbol_id("river-crossing-24px"), "river-crossing");
        assert_eq!(icon_name_from_symbol_id("river-crossing"), "river-crossing");
        assert_eq!(icon_name_from_symbol_id("-100px"), "-100px");
    }
}
