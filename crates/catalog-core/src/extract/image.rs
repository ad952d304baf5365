use super::{Extraction, Extractor, Origin, ReadSeek};
use crate::summary::Failure;
use chrono::{NaiveDate, NaiveDateTime};
use exif::{Exif, In, Tag, Value};
use image::imageops::FilterType;
use image::{DynamicImage, ImageOutputFormat};
use std::io::{BufReader, Cursor};
use tracing::trace;

/// Reads the EXIF capture time of an image and renders a PNG thumbnail of a
/// fixed width. The two steps are independent: failing one never skips the
/// other.
pub struct ImageExtractor {
    width: u32,
}

impl ImageExtractor {
    pub fn new(width: u32) -> Self {
        Self {
            width: width.max(1),
        }
    }

    fn thumbnail(
        &self,
        stream: &mut dyn ReadSeek,
        orientation: Orientation,
    ) -> Result<Vec<u8>, Failure> {
        stream.rewind().map_err(|_| Failure::Seek)?;

        let source = image::io::Reader::new(BufReader::new(&mut *stream))
            .with_guessed_format()
            .map_err(|_| Failure::Decode)?
            .decode()
            .map_err(|err| {
                trace!("image decode: {}", err);
                Failure::Decode
            })?;
        let source = orientation.correct(source);

        let height = scaled_height(source.width(), source.height(), self.width);
        let thumb = source.resize_exact(self.width, height, FilterType::CatmullRom);

        let mut out = Vec::new();
        thumb
            .write_to(&mut Cursor::new(&mut out), ImageOutputFormat::Png)
            .map_err(|err| {
                trace!("thumbnail encode: {}", err);
                Failure::Encode
            })?;
        Ok(out)
    }
}

impl Extractor for ImageExtractor {
    fn extract(&self, stream: &mut dyn ReadSeek, _origin: &Origin<'_>) -> Extraction {
        let mut extraction = Extraction::default();

        let exif = match read_exif(stream) {
            Ok(exif) => Some(exif),
            Err(Failure::Seek) => return Extraction::failed(Failure::Seek),
            Err(failure) => {
                extraction.failure = Some(failure);
                None
            }
        };

        if let Some(exif) = &exif {
            match capture_time(exif) {
                Some(time) => extraction.capture_time = Some(time),
                None => extraction.failure = Some(Failure::Timestamp),
            }
        }

        let orientation = exif
            .as_ref()
            .map(Orientation::from_exif)
            .unwrap_or_default();

        // A thumbnail failure is the later stage and replaces a metadata failure.
        match self.thumbnail(stream, orientation) {
            Ok(bytes) => extraction.thumbnail = Some(bytes),
            Err(failure) => extraction.failure = Some(failure),
        }

        extraction
    }
}

fn read_exif(stream: &mut dyn ReadSeek) -> Result<Exif, Failure> {
    stream.rewind().map_err(|_| Failure::Seek)?;
    exif::Reader::new()
        .read_from_container(&mut BufReader::new(&mut *stream))
        .map_err(|err| {
            trace!("exif: {}", err);
            Failure::Metadata
        })
}

/// `DateTimeOriginal`, falling back to the IFD0 `DateTime`.
fn capture_time(exif: &Exif) -> Option<NaiveDateTime> {
    [Tag::DateTimeOriginal, Tag::DateTime]
        .into_iter()
        .find_map(|tag| {
            let field = exif.get_field(tag, In::PRIMARY)?;
            let Value::Ascii(ref values) = field.value else {
                return None;
            };
            let stamp = exif::DateTime::from_ascii(values.first()?).ok()?;
            NaiveDate::from_ymd_opt(stamp.year.into(), stamp.month.into(), stamp.day.into())?
                .and_hms_nano_opt(
                    stamp.hour.into(),
                    stamp.minute.into(),
                    stamp.second.into(),
                    stamp.nanosecond.unwrap_or(0),
                )
        })
}

fn scaled_height(width: u32, height: u32, target_width: u32) -> u32 {
    if width == 0 {
        return 1;
    }
    let scaled = (u64::from(height) * u64::from(target_width) + u64::from(width) / 2)
        / u64::from(width);
    scaled.clamp(1, u64::from(u32::MAX)) as u32
}

/// EXIF orientation, values 1 through 8 of the `Orientation` tag.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum Orientation {
    #[default]
    Normal,
    MirroredHorizontal,
    CW180,
    MirroredVertical,
    MirroredHorizontalAnd270CW,
    CW90,
    MirroredHorizontalAnd90CW,
    CW270,
}

impl Orientation {
    fn from_exif(exif: &Exif) -> Self {
        exif.get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Self::from)
            .unwrap_or_default()
    }

    fn correct(self, img: DynamicImage) -> DynamicImage {
        match self {
            Self::Normal => img,
            Self::MirroredHorizontal => img.fliph(),
            Self::CW180 => img.rotate180(),
            Self::MirroredVertical => img.flipv(),
            Self::MirroredHorizontalAnd270CW => img.fliph().rotate270(),
            Self::CW90 => img.rotate90(),
            Self::MirroredHorizontalAnd90CW => img.fliph().rotate90(),
            Self::CW270 => img.rotate270(),
        }
    }
}

impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            2 => Self::MirroredHorizontal,
            3 => Self::CW180,
            4 => Self::MirroredVertical,
            5 => Self::MirroredHorizontalAnd270CW,
            6 => Self::CW90,
            7 => Self::MirroredHorizontalAnd90CW,
            8 => Self::CW270,
            _ => Self::Normal,
        }
    }
}
