//! Local slide-deck package builder
//!
//! Renders a package-description model into an OOXML presentation
//! container. The rendering service supplies the structure; this builder
//! supplies the concrete container format: a zip archive with the minimal
//! presentation part set (presentation, master, layout, theme, one part per
//! slide, embedded media).

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::domain::export::{PackageModel, ShapeBox, ShapeModel};

/// English Metric Units per point.
const EMU_PER_POINT: f64 = 12_700.0;

const REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_TYPE_PREFIX: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const DRAWING_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const PRESENTATION_NS: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";

pub struct PackageBuilder<'a> {
    model: &'a PackageModel,
}

struct EmbeddedImage {
    name: String,
    data: Vec<u8>,
}

struct BuiltSlide {
    shapes_xml: String,
    /// (relationship id, media file name) for each embedded picture.
    image_rels: Vec<(usize, String)>,
}

impl<'a> PackageBuilder<'a> {
    pub fn new(model: &'a PackageModel) -> Self {
        Self { model }
    }

    /// Write the package to `output`.
    ///
    /// Pictures whose source file is missing or unreadable are skipped with
    /// a warning; the rest of the deck still renders.
    pub fn build(&self, output: &Path) -> Result<()> {
        let file = File::create(output)
            .with_context(|| format!("failed to create {}", output.display()))?;
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default();

        let mut media: Vec<EmbeddedImage> = Vec::new();
        let slides: Vec<BuiltSlide> = self
            .model
            .slides
            .iter()
            .map(|slide| build_slide(&slide.shapes, &mut media))
            .collect();

        put(&mut zip, options, "[Content_Types].xml", &content_types_xml(slides.len()))?;
        put(&mut zip, options, "_rels/.rels", &root_rels_xml())?;
        put(
            &mut zip,
            options,
            "docProps/core.xml",
            &core_props_xml(self.model.name.as_deref()),
        )?;
        put(&mut zip, options, "ppt/presentation.xml", &presentation_xml(slides.len()))?;
        put(
            &mut zip,
            options,
            "ppt/_rels/presentation.xml.rels",
            &presentation_rels_xml(slides.len()),
        )?;
        put(&mut zip, options, "ppt/slideMasters/slideMaster1.xml", SLIDE_MASTER_XML)?;
        put(
            &mut zip,
            options,
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            &master_rels_xml(),
        )?;
        put(&mut zip, options, "ppt/slideLayouts/slideLayout1.xml", SLIDE_LAYOUT_XML)?;
        put(
            &mut zip,
            options,
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            &layout_rels_xml(),
        )?;
        put(&mut zip, options, "ppt/theme/theme1.xml", THEME_XML)?;

        for (index, slide) in slides.iter().enumerate() {
            let number = index + 1;
            put(
                &mut zip,
                options,
                &format!("ppt/slides/slide{number}.xml"),
                &slide_xml(&slide.shapes_xml),
            )?;
            put(
                &mut zip,
                options,
                &format!("ppt/slides/_rels/slide{number}.xml.rels"),
                &slide_rels_xml(&slide.image_rels),
            )?;
        }

        for image in &media {
            zip.start_file(format!("ppt/media/{}", image.name), options)
                .context("failed to add media entry")?;
            zip.write_all(&image.data).context("failed to write media entry")?;
        }

        zip.finish().context("failed to finalize package")?;
        Ok(())
    }
}

fn put<W: Write + std::io::Seek>(
    zip: &mut ZipWriter<W>,
    options: SimpleFileOptions,
    name: &str,
    content: &str,
) -> Result<()> {
    zip.start_file(name, options)
        .with_context(|| format!("failed to add {name}"))?;
    zip.write_all(content.as_bytes())
        .with_context(|| format!("failed to write {name}"))?;
    Ok(())
}

fn build_slide(shapes: &[ShapeModel], media: &mut Vec<EmbeddedImage>) -> BuiltSlide {
    let mut shapes_xml = String::new();
    let mut image_rels = Vec::new();
    // rId1 is reserved for the slide layout.
    let mut next_rel = 2;
    // Shape id 1 is the slide's group shape.
    let mut next_shape = 2;

    for shape in shapes {
        match shape {
            ShapeModel::TextBox {
                text,
                font_size,
                position,
            } => {
                shapes_xml.push_str(&text_shape_xml(next_shape, text, *font_size, position));
                next_shape += 1;
            }
            ShapeModel::Picture { src, position } => {
                if src.is_empty() {
                    continue;
                }
                let data = match std::fs::read(src) {
                    Ok(data) => data,
                    Err(err) => {
                        tracing::warn!(src = %src, error = %err, "skipping unreadable picture");
                        continue;
                    }
                };
                let name = format!("image{}.{}", media.len() + 1, image_extension(src));
                media.push(EmbeddedImage {
                    name: name.clone(),
                    data,
                });
                shapes_xml.push_str(&picture_shape_xml(next_shape, next_rel, position));
                image_rels.push((next_rel, name));
                next_shape += 1;
                next_rel += 1;
            }
        }
    }

    BuiltSlide {
        shapes_xml,
        image_rels,
    }
}

fn image_extension(src: &str) -> &'static str {
    match src.rsplit('.').next() {
        Some("png") => "png",
        Some("jpeg") => "jpeg",
        _ => "jpg",
    }
}

fn emu(points: f32) -> i64 {
    (points as f64 * EMU_PER_POINT).round() as i64
}

fn xml_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn xfrm_xml(position: &ShapeBox) -> String {
    format!(
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        emu(position.left),
        emu(position.top),
        emu(position.width),
        emu(position.height),
    )
}

fn text_shape_xml(shape_id: usize, text: &str, font_size: u32, position: &ShapeBox) -> String {
    let paragraphs: String = if text.is_empty() {
        "<a:p/>".to_string()
    } else {
        text.lines()
            .map(|line| {
                format!(
                    r#"<a:p><a:r><a:rPr lang="en-US" sz="{}" dirty="0"/><a:t>{}</a:t></a:r></a:p>"#,
                    font_size * 100,
                    xml_escape(line),
                )
            })
            .collect()
    };
    format!(
        concat!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="TextBox {id}"/>"#,
            r#"<p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>"#,
            r#"<p:spPr>{frame}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr>"#,
            r#"<p:txBody><a:bodyPr wrap="square"/><a:lstStyle/>{paragraphs}</p:txBody></p:sp>"#,
        ),
        id = shape_id,
        frame = xfrm_xml(position),
        paragraphs = paragraphs,
    )
}

fn picture_shape_xml(shape_id: usize, rel_id: usize, position: &ShapeBox) -> String {
    format!(
        concat!(
            r#"<p:pic><p:nvPicPr><p:cNvPr id="{id}" name="Picture {id}"/>"#,
            r#"<p:cNvPicPr/><p:nvPr/></p:nvPicPr>"#,
            r#"<p:blipFill><a:blip r:embed="rId{rel}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>"#,
            r#"<p:spPr>{frame}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#,
        ),
        id = shape_id,
        rel = rel_id,
        frame = xfrm_xml(position),
    )
}

fn slide_xml(shapes_xml: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<p:sld xmlns:a="{a}" xmlns:r="{r}" xmlns:p="{p}">"#,
            r#"<p:cSld><p:spTree>"#,
            r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
            r#"<p:grpSpPr/>{shapes}"#,
            r#"</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#,
        ),
        a = DRAWING_NS,
        r = REL_TYPE_PREFIX,
        p = PRESENTATION_NS,
        shapes = shapes_xml,
    )
}

fn content_types_xml(slide_count: usize) -> String {
    let slide_overrides: String = (1..=slide_count)
        .map(|n| {
            format!(
                r#"<Override PartName="/ppt/slides/slide{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#
            )
        })
        .collect();
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
            r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
            r#"<Default Extension="xml" ContentType="application/xml"/>"#,
            r#"<Default Extension="png" ContentType="image/png"/>"#,
            r#"<Default Extension="jpg" ContentType="image/jpeg"/>"#,
            r#"<Default Extension="jpeg" ContentType="image/jpeg"/>"#,
            r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#,
            r#"<Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>"#,
            r#"<Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/>"#,
            r#"<Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>"#,
            r#"<Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>"#,
            "{overrides}</Types>",
        ),
        overrides = slide_overrides,
    )
}

fn relationship(id: usize, kind: &str, target: &str) -> String {
    format!(
        r#"<Relationship Id="rId{id}" Type="{REL_TYPE_PREFIX}/{kind}" Target="{target}"/>"#
    )
}

fn rels_xml(entries: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Relationships xmlns="{ns}">{entries}</Relationships>"#,
        ),
        ns = REL_NS,
        entries = entries,
    )
}

fn root_rels_xml() -> String {
    let mut entries = relationship(1, "officeDocument", "ppt/presentation.xml");
    // Core properties live under the package relationship namespace, not
    // the officeDocument one.
    entries.push_str(
        r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>"#,
    );
    rels_xml(&entries)
}

/// Package core properties; carries the presentation name as the document
/// title.
fn core_props_xml(name: Option<&str>) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
            r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
            r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
            r#"<dc:title>{title}</dc:title></cp:coreProperties>"#,
        ),
        title = xml_escape(name.unwrap_or("")),
    )
}

fn presentation_xml(slide_count: usize) -> String {
    let slide_ids: String = (0..slide_count)
        .map(|i| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + i, 2 + i))
        .collect();
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<p:presentation xmlns:a="{a}" xmlns:r="{r}" xmlns:p="{p}">"#,
            r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#,
            r#"<p:sldIdLst>{slides}</p:sldIdLst>"#,
            r#"<p:sldSz cx="9144000" cy="6858000"/>"#,
            r#"<p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#,
        ),
        a = DRAWING_NS,
        r = REL_TYPE_PREFIX,
        p = PRESENTATION_NS,
        slides = slide_ids,
    )
}

fn presentation_rels_xml(slide_count: usize) -> String {
    let mut entries = relationship(1, "slideMaster", "slideMasters/slideMaster1.xml");
    for i in 0..slide_count {
        entries.push_str(&relationship(2 + i, "slide", &format!("slides/slide{}.xml", i + 1)));
    }
    rels_xml(&entries)
}

fn master_rels_xml() -> String {
    let mut entries = relationship(1, "slideLayout", "../slideLayouts/slideLayout1.xml");
    entries.push_str(&relationship(2, "theme", "../theme/theme1.xml"));
    rels_xml(&entries)
}

fn layout_rels_xml() -> String {
    rels_xml(&relationship(1, "slideMaster", "../slideMasters/slideMaster1.xml"))
}

fn slide_rels_xml(image_rels: &[(usize, String)]) -> String {
    let mut entries = relationship(1, "slideLayout", "../slideLayouts/slideLayout1.xml");
    for (rel_id, media_name) in image_rels {
        entries.push_str(&relationship(*rel_id, "image", &format!("../media/{media_name}")));
    }
    rels_xml(&entries)
}

const SLIDE_MASTER_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<p:sldMaster xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#,
    r#"<p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree></p:cSld>"#,
    r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#,
    r#"<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst></p:sldMaster>"#,
);

const SLIDE_LAYOUT_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<p:sldLayout xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#,
    r#"<p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree></p:cSld>"#,
    r#"<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#,
);

const THEME_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme"><a:themeElements>"#,
    r#"<a:clrScheme name="Office"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>"#,
    r#"<a:dk2><a:srgbClr val="44546A"/></a:dk2><a:lt2><a:srgbClr val="E7E6E6"/></a:lt2>"#,
    r#"<a:accent1><a:srgbClr val="4472C4"/></a:accent1><a:accent2><a:srgbClr val="ED7D31"/></a:accent2>"#,
    r#"<a:accent3><a:srgbClr val="A5A5A5"/></a:accent3><a:accent4><a:srgbClr val="FFC000"/></a:accent4>"#,
    r#"<a:accent5><a:srgbClr val="5B9BD5"/></a:accent5><a:accent6><a:srgbClr val="70AD47"/></a:accent6>"#,
    r#"<a:hlink><a:srgbClr val="0563C1"/></a:hlink><a:folHlink><a:srgbClr val="954F72"/></a:folHlink></a:clrScheme>"#,
    r#"<a:fontScheme name="Office"><a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>"#,
    r#"<a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme>"#,
    r#"<a:fmtScheme name="Office">"#,
    r#"<a:fillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:fillStyleLst>"#,
    r#"<a:lnStyleLst><a:ln w="6350"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="12700"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="19050"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln></a:lnStyleLst>"#,
    r#"<a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst>"#,
    r#"<a:bgFillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:bgFillStyleLst>"#,
    r#"</a:fmtScheme></a:themeElements></a:theme>"#,
);
