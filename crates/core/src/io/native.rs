//! Native multi-band GeoTIFF reading/writing (without GDAL dependency)
//!
//! Uses the `tiff` crate. A band stack is either one page per band or a
//! single page with several interleaved samples per pixel. Pages whose size
//! differs from the first one (overviews, masks) end the stack.

use super::MemoryRaster;
use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::raster::{DataType, GeoTransform};
use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::Gray32Float;
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;

const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const GEO_KEY_DIRECTORY: u16 = 34735;
const GDAL_NODATA: u16 = 42113;

const GT_MODEL_TYPE_KEY: u16 = 1024;
const GT_RASTER_TYPE_KEY: u16 = 1025;
const GEOGRAPHIC_TYPE_KEY: u16 = 2048;
const PROJECTED_CS_TYPE_KEY: u16 = 3072;
const USER_DEFINED: u16 = 32767;

fn tiff_err(context: &'static str) -> impl Fn(tiff::TiffError) -> Error {
    move |e| Error::Raster(format!("{}: {}", context, e))
}

/// Read a multi-band GeoTIFF file into a [`MemoryRaster`]
pub fn read_band_stack<P: AsRef<Path>>(path: P) -> Result<MemoryRaster> {
    let file = File::open(path.as_ref())?;
    decode_band_stack(file)
}

/// Read a multi-band GeoTIFF from an in-memory buffer
pub fn read_band_stack_from_buffer(data: &[u8]) -> Result<MemoryRaster> {
    decode_band_stack(Cursor::new(data))
}

fn decode_band_stack<R: Read + Seek>(reader: R) -> Result<MemoryRaster> {
    let mut decoder = Decoder::new(reader).map_err(tiff_err("TIFF decode error"))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(tiff_err("Cannot read dimensions"))?;
    let rows = height as usize;
    let cols = width as usize;

    // Georeferencing lives on the first page
    let transform = read_geotransform(&mut decoder).unwrap_or_default();
    let crs = read_crs(&mut decoder);
    let nodata = read_nodata(&mut decoder);

    let mut samples: Vec<f32> = Vec::new();
    let mut bands = 0;
    let mut data_type = DataType::Unknown;

    loop {
        let (page_type, page) = decode_page(&mut decoder)?;
        let pixels = rows * cols;
        if pixels == 0 || page.len() % pixels != 0 {
            return Err(Error::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }

        let per_pixel = page.len() / pixels;
        if per_pixel == 1 {
            samples.extend_from_slice(&page);
        } else {
            for s in 0..per_pixel {
                samples.extend(page.iter().skip(s).step_by(per_pixel));
            }
        }
        bands += per_pixel;
        if data_type == DataType::Unknown {
            data_type = page_type;
        }

        if !decoder.more_images() {
            break;
        }
        decoder
            .next_image()
            .map_err(tiff_err("Cannot advance to next page"))?;
        match decoder.dimensions() {
            Ok(dims) if dims == (width, height) => {}
            _ => break,
        }
    }

    Ok(MemoryRaster::from_vec(bands, rows, cols, samples)?
        .with_transform(transform)
        .with_crs(crs)
        .with_nodata(nodata)
        .with_data_type(data_type))
}

fn to_f32<T: num_traits::NumCast + Copy>(buf: &[T]) -> Vec<f32> {
    buf.iter()
        .map(|&v| num_traits::cast(v).unwrap_or(f32::NAN))
        .collect()
}

fn decode_page<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<(DataType, Vec<f32>)> {
    let result = decoder
        .read_image()
        .map_err(tiff_err("Cannot read image data"))?;

    let decoded = match result {
        DecodingResult::U8(buf) => (DataType::Byte, to_f32(&buf)),
        DecodingResult::I8(buf) => (DataType::Int8, to_f32(&buf)),
        DecodingResult::U16(buf) => (DataType::UInt16, to_f32(&buf)),
        DecodingResult::I16(buf) => (DataType::Int16, to_f32(&buf)),
        DecodingResult::U32(buf) => (DataType::UInt32, to_f32(&buf)),
        DecodingResult::I32(buf) => (DataType::Int32, to_f32(&buf)),
        DecodingResult::U64(buf) => (DataType::UInt64, to_f32(&buf)),
        DecodingResult::I64(buf) => (DataType::Int64, to_f32(&buf)),
        DecodingResult::F32(buf) => (DataType::Float32, buf),
        DecodingResult::F64(buf) => (DataType::Float64, to_f32(&buf)),
        #[allow(unreachable_patterns)]
        _ => {
            return Err(Error::UnsupportedFormat(
                "Unsupported TIFF pixel format".to_string(),
            ));
        }
    };
    Ok(decoded)
}

/// Attempt to read GeoTransform from ModelPixelScaleTag + ModelTiepointTag
fn read_geotransform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<GeoTransform> {
    let scale = decoder
        .get_tag_f64_vec(Tag::Unknown(MODEL_PIXEL_SCALE))
        .ok()?;
    let tiepoint = decoder.get_tag_f64_vec(Tag::Unknown(MODEL_TIEPOINT)).ok()?;

    if scale.len() >= 2 && tiepoint.len() >= 6 {
        // tiepoint: [I, J, K, X, Y, Z], scale: [ScaleX, ScaleY, ScaleZ]
        let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
        let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
        return Some(GeoTransform::new(origin_x, origin_y, scale[0], -scale[1]));
    }

    None
}

/// EPSG code from the GeoKeyDirectory, projected CS preferred
fn read_crs<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<CRS> {
    let keys = decoder
        .get_tag_u16_vec(Tag::Unknown(GEO_KEY_DIRECTORY))
        .ok()?;
    let lookup = |wanted: u16| {
        keys.get(4..)?
            .chunks_exact(4)
            .find(|entry| entry[0] == wanted && entry[1] == 0)
            .map(|entry| entry[3])
            .filter(|&code| code != 0 && code != USER_DEFINED)
    };

    lookup(PROJECTED_CS_TYPE_KEY)
        .or_else(|| lookup(GEOGRAPHIC_TYPE_KEY))
        .map(|code| CRS::from_epsg(code as u32))
}

fn read_nodata<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<f64> {
    let text = decoder
        .get_tag_ascii_string(Tag::Unknown(GDAL_NODATA))
        .ok()?;
    text.trim_matches(|c: char| c == '\0' || c.is_whitespace())
        .parse::<f64>()
        .ok()
}

/// Write a band stack to a GeoTIFF file, one Float32 page per band
pub fn write_band_stack<P: AsRef<Path>>(raster: &MemoryRaster, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    encode_band_stack(raster, file)
}

/// Write a band stack to an in-memory GeoTIFF buffer
pub fn write_band_stack_to_buffer(raster: &MemoryRaster) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_band_stack(raster, Cursor::new(&mut buf))?;
    Ok(buf)
}

fn geo_keys(crs: Option<&CRS>) -> Vec<u16> {
    let geographic = crs.is_some_and(|c| c.is_geographic());
    let mut entries: Vec<[u16; 4]> = vec![
        // GTModelType: 1 = projected, 2 = geographic
        [GT_MODEL_TYPE_KEY, 0, 1, if geographic { 2 } else { 1 }],
        // GTRasterType: RasterPixelIsArea
        [GT_RASTER_TYPE_KEY, 0, 1, 1],
    ];
    if let Some(code) = crs.and_then(|c| c.epsg()).and_then(|c| u16::try_from(c).ok()) {
        let key = if geographic {
            GEOGRAPHIC_TYPE_KEY
        } else {
            PROJECTED_CS_TYPE_KEY
        };
        entries.push([key, 0, 1, code]);
    }

    let mut keys = vec![1, 1, 0, entries.len() as u16];
    keys.extend(entries.iter().flatten());
    keys
}

fn encode_band_stack<W: Write + Seek>(raster: &MemoryRaster, writer: W) -> Result<()> {
    let mut encoder = TiffEncoder::new(writer).map_err(tiff_err("TIFF encoder error"))?;

    let rows = raster.rows();
    let cols = raster.cols();
    let gt = raster.transform();
    let scale = [gt.pixel_width, gt.pixel_height.abs(), 0.0];
    let tiepoint = [0.0, 0.0, 0.0, gt.origin_x, gt.origin_y, 0.0];
    let keys = geo_keys(raster.crs());
    let nodata = raster.nodata().map(|v| v.to_string());

    for band in 1..=super::RasterSource::band_count(raster) {
        let data: Vec<f32> = raster.band(band)?.iter().copied().collect();

        let mut image = encoder
            .new_image::<Gray32Float>(cols as u32, rows as u32)
            .map_err(tiff_err("Cannot create TIFF image"))?;

        image
            .encoder()
            .write_tag(Tag::Unknown(MODEL_PIXEL_SCALE), &scale[..])
            .map_err(tiff_err("Cannot write scale tag"))?;
        image
            .encoder()
            .write_tag(Tag::Unknown(MODEL_TIEPOINT), &tiepoint[..])
            .map_err(tiff_err("Cannot write tiepoint tag"))?;
        image
            .encoder()
            .write_tag(Tag::Unknown(GEO_KEY_DIRECTORY), keys.as_slice())
            .map_err(tiff_err("Cannot write geokey tag"))?;
        if let Some(nodata) = &nodata {
            image
                .encoder()
                .write_tag(Tag::Unknown(GDAL_NODATA), nodata.as_str())
                .map_err(tiff_err("Cannot write nodata tag"))?;
        }

        image
            .write_data(&data)
            .map_err(tiff_err("Cannot write image data"))?;
    }

    Ok(())
}
