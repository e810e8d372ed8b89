//! PPTX file parser implementation.

use slidepng_core::{
    Color, Error, Fill, Paragraph, Result, Shape, ShapeFrame, Slide, SlideDeck, SlideSize, TextRun,
};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{Read, Seek};
use zip::ZipArchive;

/// Parser for PPTX (Office Open XML) files.
pub struct PptxParser;

impl PptxParser {
    /// Create a new PPTX parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse a PPTX file from a reader into a renderable deck.
    pub fn parse<R: Read + Seek>(&self, reader: R, filename: &str) -> Result<SlideDeck> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let pres_xml = self.read_file_from_archive(&mut archive, "ppt/presentation.xml")?;
        let slide_size = parse_slide_size(&pres_xml)?.unwrap_or_default();
        let id_order = parse_slide_id_list(&pres_xml)?;

        let rels_xml =
            self.read_file_from_archive(&mut archive, "ppt/_rels/presentation.xml.rels")?;
        let relationships = parse_slide_relationships(&rels_xml)?;

        // A presentation with no slides is a valid, empty deck.
        let slide_paths = order_slide_parts(&id_order, &relationships);

        let mut deck = SlideDeck::new(filename, slide_size);
        for (idx, slide_path) in slide_paths.iter().enumerate() {
            let xml = self.read_file_from_archive(&mut archive, slide_path)?;
            let slide = parse_slide_xml(&xml, idx + 1)?;
            deck.add_slide(slide);
        }

        Ok(deck)
    }

    /// Read a file from the ZIP archive.
    fn read_file_from_archive<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        path: &str,
    ) -> Result<String> {
        let mut file = archive
            .by_name(path)
            .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", path, e)))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

        Ok(content)
    }
}

impl Default for PptxParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the slide canvas size from `p:sldSz` in presentation.xml.
fn parse_slide_size(xml: &str) -> Result<Option<SlideSize>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if local_name(e.name().as_ref()) == b"sldSz" =>
            {
                let mut cx = None;
                let mut cy = None;
                for attr in e.attributes().flatten() {
                    let value = String::from_utf8_lossy(&attr.value);
                    match attr.key.as_ref() {
                        b"cx" => cx = value.parse::<i64>().ok(),
                        b"cy" => cy = value.parse::<i64>().ok(),
                        _ => {}
                    }
                }
                return match (cx, cy) {
                    (Some(cx), Some(cy)) if cx > 0 && cy > 0 => {
                        Ok(Some(SlideSize { cx, cy }))
                    }
                    _ => Err(Error::XmlError("Invalid sldSz element".to_string())),
                };
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing presentation.xml: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(None)
}

/// Extract the ordered relationship ids from `p:sldIdLst` in presentation.xml.
fn parse_slide_id_list(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut in_list = false;
    let mut ids = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let qname = e.name();
                let name = local_name(qname.as_ref());
                if name == b"sldIdLst" {
                    in_list = true;
                } else if in_list && name == b"sldId" {
                    for attr in e.attributes().flatten() {
                        // The relationship id attribute is in the r: namespace.
                        if local_name(attr.key.as_ref()) == b"id"
                            && attr.key.as_ref() != b"id"
                        {
                            ids.push(String::from_utf8_lossy(&attr.value).to_string());
                        }
                    }
                }
            }
            Ok(Event::End(ref e)) if local_name(e.name().as_ref()) == b"sldIdLst" => {
                in_list = false;
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing sldIdLst: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(ids)
}

/// Parse `ppt/_rels/presentation.xml.rels` into a map from relationship
/// id to the slide part path inside the archive.
fn parse_slide_relationships(xml: &str) -> Result<HashMap<String, String>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut relationships = HashMap::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if e.name().as_ref() == b"Relationship" =>
            {
                let mut rel_type = String::new();
                let mut target = String::new();
                let mut id = String::new();

                for attr in e.attributes().flatten() {
                    let value = String::from_utf8_lossy(&attr.value).to_string();
                    match attr.key.as_ref() {
                        b"Type" => rel_type = value,
                        b"Target" => target = value,
                        b"Id" => id = value,
                        _ => {}
                    }
                }

                if is_slide_relationship(&rel_type) {
                    relationships.insert(id, normalize_part_path(&target));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing relationships: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(relationships)
}

/// Whether a relationship type names a slide part (not a layout, master,
/// or notes slide).
fn is_slide_relationship(rel_type: &str) -> bool {
    rel_type.ends_with("/slide")
        || (rel_type.contains("/slide")
            && !rel_type.contains("slideLayout")
            && !rel_type.contains("slideMaster")
            && !rel_type.contains("notesSlide"))
}

/// Resolve a relationship target to a full archive path.
fn normalize_part_path(target: &str) -> String {
    if let Some(stripped) = target.strip_prefix('/') {
        stripped.to_string()
    } else {
        format!("ppt/{}", target)
    }
}

/// Order slide part paths by the `sldIdLst` relationship order. When the
/// list is missing or incomplete, fall back to the numeric suffix of the
/// relationship id (rId2 before rId10).
fn order_slide_parts(id_order: &[String], relationships: &HashMap<String, String>) -> Vec<String> {
    let ordered: Vec<String> = id_order
        .iter()
        .filter_map(|id| relationships.get(id).cloned())
        .collect();

    if ordered.len() == relationships.len() {
        return ordered;
    }

    log::debug!(
        "sldIdLst covers {} of {} slide relationships, sorting by id",
        ordered.len(),
        relationships.len()
    );

    let mut entries: Vec<(&String, &String)> = relationships.iter().collect();
    entries.sort_by(|a, b| {
        match (trailing_number(a.0), trailing_number(b.0)) {
            (Some(na), Some(nb)) => na.cmp(&nb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.1.cmp(b.1),
        }
    });
    entries.into_iter().map(|(_, path)| path.clone()).collect()
}

/// Extract a trailing number from a string like "rId2" or "slide3.xml".
fn trailing_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");
    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.chars().rev().collect::<String>().parse().ok()
}

/// Streaming parse of one slide part into the renderable slide model.
///
/// Collects the slide background, and per shape the frame, solid fill,
/// and text paragraphs. Unknown elements are skipped.
fn parse_slide_xml(xml: &str, slide_number: usize) -> Result<Slide> {
    // No trim_text here: leading and trailing spaces inside a:t are
    // significant for inter-run spacing.
    let mut reader = Reader::from_str(xml);

    let mut slide = Slide::new(slide_number);

    let mut current_shape: Option<Shape> = None;
    let mut pending_offset: Option<(i64, i64)> = None;
    let mut pending_extent: Option<(i64, i64)> = None;
    let mut current_paragraph: Option<Paragraph> = None;
    let mut current_run: Option<TextRun> = None;

    let mut in_background = false;
    let mut in_shape_props = false;
    let mut in_run_props = false;
    let mut in_text = false;
    let mut in_solid_fill = false;
    let mut in_outline = false;

    loop {
        let event = reader.read_event();
        let is_empty = matches!(event, Ok(Event::Empty(_)));
        match event {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let qname = e.name();
                let name = local_name(qname.as_ref());

                match name {
                    b"bg" => in_background = true,
                    b"sp" | b"pic" => {
                        current_shape = Some(Shape::default());
                        pending_offset = None;
                        pending_extent = None;
                    }
                    b"spPr" => in_shape_props = true,
                    b"off" if in_shape_props => {
                        pending_offset = parse_point_attrs(e, b"x", b"y");
                    }
                    b"ext" if in_shape_props => {
                        pending_extent = parse_point_attrs(e, b"cx", b"cy");
                    }
                    b"ln" => in_outline = !is_empty,
                    b"solidFill" => in_solid_fill = true,
                    b"srgbClr" if in_solid_fill && !in_outline => {
                        if let Some(color) = parse_srgb_attr(e) {
                            if in_run_props {
                                if let Some(ref mut run) = current_run {
                                    run.color = Some(color);
                                }
                            } else if in_shape_props {
                                if let Some(ref mut shape) = current_shape {
                                    shape.fill = Some(Fill::Solid(color));
                                }
                            } else if in_background {
                                slide.background = Some(Fill::Solid(color));
                            }
                        }
                    }
                    b"p" if current_shape.is_some() => {
                        current_paragraph = Some(Paragraph::default());
                    }
                    b"r" if current_paragraph.is_some() => {
                        current_run = Some(TextRun::default());
                    }
                    b"rPr" => {
                        in_run_props = true;
                        if let Some(ref mut run) = current_run {
                            apply_run_properties(e, run);
                        }
                        if is_empty {
                            in_run_props = false;
                        }
                    }
                    b"t" => in_text = !is_empty,
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) => {
                if in_text {
                    if let Some(ref mut run) = current_run {
                        let text = e.unescape().unwrap_or_default();
                        run.text.push_str(&text);
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                let qname = e.name();
                let name = local_name(qname.as_ref());
                match name {
                    b"bg" => in_background = false,
                    b"spPr" => in_shape_props = false,
                    b"ln" => in_outline = false,
                    b"solidFill" => in_solid_fill = false,
                    b"rPr" => in_run_props = false,
                    b"t" => in_text = false,
                    b"r" => {
                        if let (Some(paragraph), Some(run)) =
                            (current_paragraph.as_mut(), current_run.take())
                        {
                            paragraph.runs.push(run);
                        }
                    }
                    b"p" => {
                        if let (Some(shape), Some(paragraph)) =
                            (current_shape.as_mut(), current_paragraph.take())
                        {
                            shape.paragraphs.push(paragraph);
                        }
                    }
                    b"sp" | b"pic" => {
                        if let Some(mut shape) = current_shape.take() {
                            if let (Some((x, y)), Some((cx, cy))) =
                                (pending_offset.take(), pending_extent.take())
                            {
                                shape.frame = Some(ShapeFrame { x, y, cx, cy });
                            }
                            slide.add_shape(shape);
                        }
                        current_paragraph = None;
                        current_run = None;
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                log::warn!("XML parsing error in slide {} (continuing): {}", slide_number, e);
            }
            _ => {}
        }
    }

    Ok(slide)
}

/// Read a pair of integer attributes from an element (`a:off` x/y or
/// `a:ext` cx/cy).
fn parse_point_attrs(
    e: &quick_xml::events::BytesStart<'_>,
    first: &[u8],
    second: &[u8],
) -> Option<(i64, i64)> {
    let mut a = None;
    let mut b = None;
    for attr in e.attributes().flatten() {
        let value = String::from_utf8_lossy(&attr.value);
        if attr.key.as_ref() == first {
            a = value.parse::<i64>().ok();
        } else if attr.key.as_ref() == second {
            b = value.parse::<i64>().ok();
        }
    }
    match (a, b) {
        (Some(a), Some(b)) => Some((a, b)),
        _ => None,
    }
}

/// Read the `val` attribute of an `a:srgbClr` element as a color.
fn parse_srgb_attr(e: &quick_xml::events::BytesStart<'_>) -> Option<Color> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == b"val" {
            return Color::from_hex(&String::from_utf8_lossy(&attr.value));
        }
    }
    None
}

/// Apply `a:rPr` attributes (size, bold) to a run.
fn apply_run_properties(e: &quick_xml::events::BytesStart<'_>, run: &mut TextRun) {
    for attr in e.attributes().flatten() {
        let value = String::from_utf8_lossy(&attr.value);
        match attr.key.as_ref() {
            b"sz" => run.size_centipoints = value.parse::<u32>().ok(),
            b"b" => run.bold = value.as_ref() == "1" || value.as_ref() == "true",
            _ => {}
        }
    }
}

/// Extract the local name from a potentially namespaced XML element name.
fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::FileOptions;
    use zip::ZipWriter;

    const PRESENTATION_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"
                xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <p:sldIdLst>
    <p:sldId id="256" r:id="rId3"/>
    <p:sldId id="257" r:id="rId2"/>
  </p:sldIdLst>
  <p:sldSz cx="12192000" cy="6858000"/>
</p:presentation>"#;

    const RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide2.xml"/>
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/>
</Relationships>"#;

    const SLIDE1_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"
       xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
  <p:cSld>
    <p:bg>
      <p:bgPr>
        <a:solidFill><a:srgbClr val="112233"/></a:solidFill>
      </p:bgPr>
    </p:bg>
    <p:spTree>
      <p:sp>
        <p:spPr>
          <a:xfrm>
            <a:off x="914400" y="457200"/>
            <a:ext cx="4572000" cy="914400"/>
          </a:xfrm>
          <a:solidFill><a:srgbClr val="FF0000"/></a:solidFill>
        </p:spPr>
        <p:txBody>
          <a:p>
            <a:r>
              <a:rPr lang="en-US" sz="3200" b="1">
                <a:solidFill><a:srgbClr val="00FF00"/></a:solidFill>
              </a:rPr>
              <a:t>Title text</a:t>
            </a:r>
            <a:r>
              <a:rPr lang="en-US" sz="1800"/>
              <a:t> continued</a:t>
            </a:r>
          </a:p>
          <a:p>
            <a:r><a:t>Second paragraph</a:t></a:r>
          </a:p>
        </p:txBody>
      </p:sp>
    </p:spTree>
  </p:cSld>
</p:sld>"#;

    const SLIDE2_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"
       xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
  <p:cSld>
    <p:spTree>
      <p:sp>
        <p:spPr/>
        <p:txBody>
          <a:p><a:r><a:t>Plain slide</a:t></a:r></a:p>
        </p:txBody>
      </p:sp>
    </p:spTree>
  </p:cSld>
</p:sld>"#;

    /// Build a minimal two-slide .pptx archive in memory.
    fn build_test_pptx() -> Cursor<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();

        let parts: &[(&str, &str)] = &[
            ("ppt/presentation.xml", PRESENTATION_XML),
            ("ppt/_rels/presentation.xml.rels", RELS_XML),
            ("ppt/slides/slide1.xml", SLIDE1_XML),
            ("ppt/slides/slide2.xml", SLIDE2_XML),
        ];

        for (name, content) in parts {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }

        let mut cursor = zip.finish().unwrap();
        cursor.set_position(0);
        cursor
    }

    #[test]
    fn test_parse_deck_structure() {
        let parser = PptxParser::new();
        let deck = parser.parse(build_test_pptx(), "test.pptx").unwrap();

        assert_eq!(deck.filename, "test.pptx");
        assert_eq!(deck.slide_count(), 2);
        assert_eq!(
            deck.slide_size,
            SlideSize {
                cx: 12_192_000,
                cy: 6_858_000
            }
        );
        assert_eq!(deck.slides[0].number, 1);
        assert_eq!(deck.slides[1].number, 2);
    }

    #[test]
    fn test_slide_order_follows_sld_id_list() {
        // rId3 -> slide1.xml comes first in sldIdLst even though rId2 sorts lower.
        let parser = PptxParser::new();
        let deck = parser.parse(build_test_pptx(), "test.pptx").unwrap();

        // slide1.xml has a background, slide2.xml does not.
        assert!(deck.slides[0].background.is_some());
        assert!(deck.slides[1].background.is_none());
    }

    #[test]
    fn test_slide_background_and_shape_fill() {
        let parser = PptxParser::new();
        let deck = parser.parse(build_test_pptx(), "test.pptx").unwrap();

        let slide = &deck.slides[0];
        assert_eq!(
            slide.background,
            Some(Fill::Solid(Color {
                r: 0x11,
                g: 0x22,
                b: 0x33
            }))
        );

        let shape = &slide.shapes[0];
        assert_eq!(
            shape.fill,
            Some(Fill::Solid(Color { r: 255, g: 0, b: 0 }))
        );
        assert_eq!(
            shape.frame,
            Some(ShapeFrame {
                x: 914_400,
                y: 457_200,
                cx: 4_572_000,
                cy: 914_400
            })
        );
    }

    #[test]
    fn test_text_runs_and_properties() {
        let parser = PptxParser::new();
        let deck = parser.parse(build_test_pptx(), "test.pptx").unwrap();

        let shape = &deck.slides[0].shapes[0];
        assert_eq!(shape.paragraphs.len(), 2);

        let first = &shape.paragraphs[0];
        assert_eq!(first.runs.len(), 2);
        assert_eq!(first.runs[0].text, "Title text");
        assert_eq!(first.runs[0].size_centipoints, Some(3200));
        assert!(first.runs[0].bold);
        assert_eq!(
            first.runs[0].color,
            Some(Color { r: 0, g: 255, b: 0 })
        );
        assert_eq!(first.runs[1].text, " continued");
        assert!(!first.runs[1].bold);
        assert_eq!(first.text(), "Title text continued");

        assert_eq!(shape.paragraphs[1].text(), "Second paragraph");
    }

    #[test]
    fn test_zero_slide_deck_parses_as_empty() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();

        zip.start_file("ppt/presentation.xml", options).unwrap();
        zip.write_all(
            br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"
                xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <p:sldIdLst/>
  <p:sldSz cx="12192000" cy="6858000"/>
</p:presentation>"#,
        )
        .unwrap();

        zip.start_file("ppt/_rels/presentation.xml.rels", options)
            .unwrap();
        zip.write_all(
            br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>
</Relationships>"#,
        )
        .unwrap();

        let mut cursor = zip.finish().unwrap();
        cursor.set_position(0);

        let deck = PptxParser::new().parse(cursor, "empty.pptx").unwrap();
        assert_eq!(deck.slide_count(), 0);
        assert_eq!(
            deck.slide_size,
            SlideSize {
                cx: 12_192_000,
                cy: 6_858_000
            }
        );
    }

    #[test]
    fn test_missing_presentation_xml_is_an_error() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("ppt/slides/slide1.xml", FileOptions::default())
            .unwrap();
        zip.write_all(SLIDE2_XML.as_bytes()).unwrap();
        let mut cursor = zip.finish().unwrap();
        cursor.set_position(0);

        let parser = PptxParser::new();
        assert!(parser.parse(cursor, "broken.pptx").is_err());
    }

    #[test]
    fn test_not_a_zip_is_an_error() {
        let parser = PptxParser::new();
        let result = parser.parse(Cursor::new(b"not a zip file".to_vec()), "junk.pptx");
        assert!(matches!(result, Err(Error::ZipError(_))));
    }

    #[test]
    fn test_trailing_number() {
        assert_eq!(trailing_number("rId1"), Some(1));
        assert_eq!(trailing_number("rId12"), Some(12));
        assert_eq!(trailing_number("slide3.xml"), Some(3));
        assert_eq!(trailing_number("nodigits"), None);
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"p:sp"), b"sp");
        assert_eq!(local_name(b"a:t"), b"t");
        assert_eq!(local_name(b"sp"), b"sp");
    }

    #[test]
    fn test_normalize_part_path() {
        assert_eq!(normalize_part_path("slides/slide1.xml"), "ppt/slides/slide1.xml");
        assert_eq!(normalize_part_path("/ppt/slides/slide1.xml"), "ppt/slides/slide1.xml");
    }

    #[test]
    fn test_is_slide_relationship() {
        assert!(is_slide_relationship(
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide"
        ));
        assert!(!is_slide_relationship(
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster"
        ));
        assert!(!is_slide_relationship(
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout"
        ));
        assert!(!is_slide_relationship(
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesSlide"
        ));
    }
}
