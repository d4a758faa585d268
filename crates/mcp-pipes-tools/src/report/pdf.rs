//! Minimal PDF 1.4 writer: Helvetica text lines, an optional JPEG or PNG
//! image, A4 pages.

use std::fmt::Write as _;
use std::io::Write as _;

use flate2::write::ZlibEncoder;
use flate2::Compression;

/// A4 portrait, in points.
pub const PAGE_WIDTH: f32 = 595.0;
pub const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 56.0;

/// Standard Type 1 fonts available without embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
    Italic,
}

impl Font {
    fn resource_name(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
            Font::Italic => "F3",
        }
    }

    fn base_font(self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
            Font::Italic => "Helvetica-Oblique",
        }
    }
}

/// How an image stream is compressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFilter {
    /// JPEG bytes, embedded as-is.
    Dct,
    /// Zlib-compressed 8-bit samples.
    Flate,
}

impl ImageFilter {
    fn pdf_name(self) -> &'static str {
        match self {
            ImageFilter::Dct => "DCTDecode",
            ImageFilter::Flate => "FlateDecode",
        }
    }
}

/// An image placed at the top of the first page.
#[derive(Debug, Clone)]
pub struct PdfImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub components: u8,
    pub filter: ImageFilter,
    /// Drawn size in points.
    pub draw_width: f32,
    pub draw_height: f32,
}

impl PdfImage {
    /// JPEG or PNG, whichever `data` turns out to be.
    pub fn from_bytes(data: &[u8], draw_width: f32, draw_height: f32) -> Option<Self> {
        Self::jpeg(data, draw_width, draw_height)
            .or_else(|| Self::png(data, draw_width, draw_height))
    }

    /// Parse the frame header of a baseline or progressive JPEG.
    pub fn jpeg(data: &[u8], draw_width: f32, draw_height: f32) -> Option<Self> {
        if !data.starts_with(&[0xFF, 0xD8]) {
            return None;
        }
        let mut pos = 2;
        while pos + 4 <= data.len() {
            if data[pos] != 0xFF {
                return None;
            }
            let marker = data[pos + 1];
            let len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
            let is_frame =
                (0xC0..=0xCF).contains(&marker) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
            if is_frame {
                if pos + 10 > data.len() {
                    return None;
                }
                let height = u16::from_be_bytes([data[pos + 5], data[pos + 6]]) as u32;
                let width = u16::from_be_bytes([data[pos + 7], data[pos + 8]]) as u32;
                return Some(Self {
                    data: data.to_vec(),
                    width,
                    height,
                    components: data[pos + 9],
                    filter: ImageFilter::Dct,
                    draw_width,
                    draw_height,
                });
            }
            pos += 2 + len;
        }
        None
    }

    /// Decode a PNG to 8-bit gray or RGB samples and re-compress them.
    ///
    /// Palettes are expanded. Transparent pixels are composited onto white,
    /// since the page background is white.
    pub fn png(data: &[u8], draw_width: f32, draw_height: f32) -> Option<Self> {
        if !data.starts_with(b"\x89PNG") {
            return None;
        }
        let mut decoder = png::Decoder::new(data);
        decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
        let mut reader = match decoder.read_info() {
            Ok(reader) => reader,
            Err(e) => {
                log::debug!("unreadable PNG header: {e}");
                return None;
            }
        };
        let mut buf = vec![0; reader.output_buffer_size()];
        let frame = match reader.next_frame(&mut buf) {
            Ok(frame) => frame,
            Err(e) => {
                log::debug!("undecodable PNG data: {e}");
                return None;
            }
        };
        let pixels = &buf[..frame.buffer_size()];

        let (components, samples) = match frame.color_type {
            png::ColorType::Grayscale => (1, pixels.to_vec()),
            png::ColorType::Rgb => (3, pixels.to_vec()),
            png::ColorType::GrayscaleAlpha => (1, flatten_alpha(pixels, 1)),
            png::ColorType::Rgba => (3, flatten_alpha(pixels, 3)),
            png::ColorType::Indexed => {
                log::debug!("PNG palette was not expanded");
                return None;
            }
        };

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        let compressed = match encoder.write_all(&samples).and_then(|()| encoder.finish()) {
            Ok(compressed) => compressed,
            Err(e) => {
                log::debug!("failed to compress PNG samples: {e}");
                return None;
            }
        };

        Some(Self {
            data: compressed,
            width: frame.width,
            height: frame.height,
            components,
            filter: ImageFilter::Flate,
            draw_width,
            draw_height,
        })
    }

    fn color_space(&self) -> &'static str {
        match self.components {
            1 => "DeviceGray",
            4 => "DeviceCMYK",
            _ => "DeviceRGB",
        }
    }
}

/// Drop the alpha channel from interleaved samples, blending onto white.
fn flatten_alpha(pixels: &[u8], color: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(pixels.len() / (color + 1) * color);
    for px in pixels.chunks_exact(color + 1) {
        let alpha = u16::from(px[color]);
        for &c in &px[..color] {
            let blended = (u16::from(c) * alpha + 255 * (255 - alpha)) / 255;
            out.push(blended as u8);
        }
    }
    out
}

/// One line of laid-out text.
#[derive(Debug, Clone)]
pub struct Line {
    pub font: Font,
    pub size: f32,
    pub text: String,
    /// Extra vertical space before this line.
    pub space_before: f32,
}

impl Line {
    pub fn new(font: Font, size: f32, text: impl Into<String>) -> Self {
        Self {
            font,
            size,
            text: text.into(),
            space_before: 0.0,
        }
    }

    pub fn spaced(mut self, space_before: f32) -> Self {
        self.space_before = space_before;
        self
    }
}

/// Lays lines out top to bottom, starting a new page when one fills up.
#[derive(Debug, Default)]
pub struct PdfDocument {
    image: Option<PdfImage>,
    lines: Vec<Line>,
}

impl PdfDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn image(&mut self, image: PdfImage) -> &mut Self {
        self.image = Some(image);
        self
    }

    pub fn line(&mut self, line: Line) -> &mut Self {
        self.lines.push(line);
        self
    }

    /// Split lines into page content streams.
    fn paginate(&self) -> Vec<String> {
        let mut pages = Vec::new();
        let mut content = String::new();
        let mut y = PAGE_HEIGHT - MARGIN;

        if let Some(img) = &self.image {
            y -= img.draw_height;
            let _ = writeln!(
                content,
                "q {:.2} 0 0 {:.2} {:.2} {:.2} cm /Im1 Do Q",
                img.draw_width, img.draw_height, MARGIN, y
            );
            y -= 20.0;
        }

        for line in &self.lines {
            let advance = line.space_before + line.size * 1.3;
            if y - advance < MARGIN && !content.is_empty() {
                pages.push(std::mem::take(&mut content));
                y = PAGE_HEIGHT - MARGIN;
            }
            y -= advance;
            let _ = writeln!(
                content,
                "BT /{} {:.1} Tf {:.2} {:.2} Td ({}) Tj ET",
                line.font.resource_name(),
                line.size,
                MARGIN,
                y,
                escape_pdf_string(&line.text)
            );
        }

        if !content.is_empty() || pages.is_empty() {
            pages.push(content);
        }
        pages
    }

    /// Serialize the document.
    pub fn to_bytes(&self) -> Vec<u8> {
        let pages = self.paginate();
        let fonts = [Font::Regular, Font::Bold, Font::Italic];

        // Object numbering: 1 catalog, 2 pages, 3..=5 fonts, then image, then page/content pairs.
        let image_obj = self.image.as_ref().map(|_| 6);
        let first_page_obj = if image_obj.is_some() { 7 } else { 6 };
        let page_ids: Vec<usize> = (0..pages.len()).map(|i| first_page_obj + i * 2).collect();

        let mut objects: Vec<Vec<u8>> = Vec::new();
        objects.push(b"<< /Type /Catalog /Pages 2 0 R >>".to_vec());

        let kids: Vec<String> = page_ids.iter().map(|id| format!("{id} 0 R")).collect();
        objects.push(
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                kids.join(" "),
                pages.len()
            )
            .into_bytes(),
        );

        for font in fonts {
            objects.push(
                format!(
                    "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                    font.base_font()
                )
                .into_bytes(),
            );
        }

        if let Some(img) = &self.image {
            let mut obj = format!(
                "<< /Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace /{} \
                 /BitsPerComponent 8 /Filter /{} /Length {} >>\nstream\n",
                img.width,
                img.height,
                img.color_space(),
                img.filter.pdf_name(),
                img.data.len()
            )
            .into_bytes();
            obj.extend_from_slice(&img.data);
            obj.extend_from_slice(b"\nendstream");
            objects.push(obj);
        }

        let font_resources = fonts
            .iter()
            .enumerate()
            .map(|(i, f)| format!("/{} {} 0 R", f.resource_name(), i + 3))
            .collect::<Vec<_>>()
            .join(" ");
        let xobjects = image_obj
            .map(|id| format!(" /XObject << /Im1 {id} 0 R >>"))
            .unwrap_or_default();

        for (i, content) in pages.iter().enumerate() {
            let content_id = page_ids[i] + 1;
            objects.push(
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
                     /Resources << /Font << {font_resources} >>{} >> /Contents {content_id} 0 R >>",
                    if i == 0 { xobjects.as_str() } else { "" }
                )
                .into_bytes(),
            );
            objects.push(
                format!(
                    "<< /Length {} >>\nstream\n{content}endstream",
                    content.len()
                )
                .into_bytes(),
            );
        }

        let mut out = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n", i + 1).as_bytes());
            out.extend_from_slice(body);
            out.extend_from_slice(b"\nendobj\n");
        }

        let xref_offset = out.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            let _ = writeln!(xref, "{offset:010} 00000 n ");
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
            objects.len() + 1
        );
        out.extend_from_slice(xref.as_bytes());
        out
    }
}

/// Escape a literal string; non-ASCII characters become `?`.
fn escape_pdf_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            c if (c as u32) < 0x20 => out.push(' '),
            c if (c as u32) < 0x7F => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

/// Greedy word wrap at `width` characters.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if !current.is_empty() && current.len() + 1 + word.len() > width {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        lines.push(current);
    }
    lines
}
