//! Synthetic JPEG/Exif fixtures.
//!
//! Layout: SOI, APP0 (JFIF), optional XMP APP1, Exif APP1 (TIFF header, IFD0,
//! GPS sub-IFD), SOS header, scan bytes, EOI. The builder records where every
//! entry's value bytes ended up so tests can check exactly which bytes moved.

#![allow(dead_code)]

use std::ops::Range;

pub const TAG_GPS_INFO: u16 = 0x8825;
pub const TAG_MAKE: u16 = 0x010F;
pub const TAG_DATE_TIME_ORIGINAL: u16 = 0x9003;

pub mod gps {
    pub const VERSION_ID: u16 = 0x0000;
    pub const LATITUDE_REF: u16 = 0x0001;
    pub const LATITUDE: u16 = 0x0002;
    pub const LONGITUDE_REF: u16 = 0x0003;
    pub const LONGITUDE: u16 = 0x0004;
    pub const ALTITUDE_REF: u16 = 0x0005;
    pub const ALTITUDE: u16 = 0x0006;
    pub const TIME_STAMP: u16 = 0x0007;
    pub const MAP_DATUM: u16 = 0x0012;
    pub const DEST_BEARING: u16 = 0x0018;
    pub const PROCESSING_METHOD: u16 = 0x001B;
    pub const DATE_STAMP: u16 = 0x001D;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Big,
    Little,
}

impl Order {
    pub fn marker(self) -> [u8; 2] {
        match self {
            Order::Big => *b"MM",
            Order::Little => *b"II",
        }
    }

    pub fn u16(self, v: u16) -> [u8; 2] {
        match self {
            Order::Big => v.to_be_bytes(),
            Order::Little => v.to_le_bytes(),
        }
    }

    pub fn u32(self, v: u32) -> [u8; 4] {
        match self {
            Order::Big => v.to_be_bytes(),
            Order::Little => v.to_le_bytes(),
        }
    }

    pub fn read_u32(self, b: &[u8]) -> u32 {
        let a = [b[0], b[1], b[2], b[3]];
        match self {
            Order::Big => u32::from_be_bytes(a),
            Order::Little => u32::from_le_bytes(a),
        }
    }

    /// Decode `(numerator, denominator)` pairs from raw rational bytes.
    pub fn rationals(self, b: &[u8]) -> Vec<(u32, u32)> {
        b.chunks(8)
            .map(|c| (self.read_u32(&c[..4]), self.read_u32(&c[4..])))
            .collect()
    }
}

/// One IFD entry with its raw value bytes already in the target byte order.
#[derive(Debug, Clone)]
pub struct Tag {
    pub tag: u16,
    pub kind: u16,
    pub count: u32,
    pub data: Vec<u8>,
}

impl Tag {
    pub fn ascii(tag: u16, s: &[u8]) -> Self {
        Self {
            tag,
            kind: 2,
            count: s.len() as u32,
            data: s.to_vec(),
        }
    }

    pub fn bytes(tag: u16, b: &[u8]) -> Self {
        Self {
            tag,
            kind: 1,
            count: b.len() as u32,
            data: b.to_vec(),
        }
    }

    pub fn undefined(tag: u16, b: &[u8]) -> Self {
        Self {
            tag,
            kind: 7,
            count: b.len() as u32,
            data: b.to_vec(),
        }
    }

    pub fn rationals(tag: u16, vals: &[(u32, u32)], order: Order) -> Self {
        let data = vals
            .iter()
            .flat_map(|&(n, d)| [order.u32(n), order.u32(d)].concat())
            .collect();
        Self {
            tag,
            kind: 5,
            count: vals.len() as u32,
            data,
        }
    }

    pub fn srationals(tag: u16, vals: &[(i32, i32)], order: Order) -> Self {
        let data = vals
            .iter()
            .flat_map(|&(n, d)| [order.u32(n as u32), order.u32(d as u32)].concat())
            .collect();
        Self {
            tag,
            kind: 10,
            count: vals.len() as u32,
            data,
        }
    }

    pub fn short(tag: u16, v: u16, order: Order) -> Self {
        Self {
            tag,
            kind: 3,
            count: 1,
            data: order.u16(v).to_vec(),
        }
    }
}

/// A built JPEG and the absolute positions of its interesting parts.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub bytes: Vec<u8>,
    pub order: Order,
    pub tiff_start: usize,
    pub ifd0_values: Vec<(u16, Range<usize>)>,
    pub gps_values: Vec<(u16, Range<usize>)>,
    pub scan_data: Range<usize>,
}

impl Fixture {
    pub fn gps_value(&self, tag: u16) -> Range<usize> {
        lookup(&self.gps_values, tag)
    }

    pub fn ifd0_value(&self, tag: u16) -> Range<usize> {
        lookup(&self.ifd0_values, tag)
    }

    /// Value ranges of `tag` in every GPS sub-IFD, in IFD0 pointer order.
    pub fn gps_values_of(&self, tag: u16) -> Vec<Range<usize>> {
        self.gps_values
            .iter()
            .filter(|(t, _)| *t == tag)
            .map(|(_, r)| r.clone())
            .collect()
    }

    /// The Exif APP1 segment, marker and length included.
    pub fn exif_segment(&self) -> Range<usize> {
        let start = self.tiff_start - 10;
        let len = u16::from_be_bytes([self.bytes[start + 2], self.bytes[start + 3]]) as usize;
        start..start + 2 + len
    }

    /// Insert `other`'s Exif APP1 segment right after this fixture's own.
    ///
    /// Returns the combined file and how far `other`'s positions moved.
    pub fn with_exif_of(&self, other: &Fixture) -> (Vec<u8>, usize) {
        let at = self.exif_segment().end;
        let seg = other.exif_segment();
        assert!(at >= seg.start);
        let mut out = self.bytes[..at].to_vec();
        out.extend_from_slice(&other.bytes[seg.clone()]);
        out.extend_from_slice(&self.bytes[at..]);
        (out, at - seg.start)
    }

    /// `true` if `offset` lies inside any GPS value region.
    pub fn in_gps_value(&self, offset: usize) -> bool {
        self.gps_values.iter().any(|(_, r)| r.contains(&offset))
    }
}

fn lookup(values: &[(u16, Range<usize>)], tag: u16) -> Range<usize> {
    values
        .iter()
        .find(|(t, _)| *t == tag)
        .map(|(_, r)| r.clone())
        .unwrap_or_else(|| panic!("tag 0x{tag:04x} not in fixture"))
}

pub struct Builder {
    order: Order,
    ifd0: Vec<Tag>,
    gps: Vec<Vec<Tag>>,
    xmp_first: bool,
}

impl Builder {
    pub fn new(order: Order) -> Self {
        Self {
            order,
            ifd0: Vec::new(),
            gps: Vec::new(),
            xmp_first: false,
        }
    }

    pub fn ifd0(mut self, tag: Tag) -> Self {
        self.ifd0.push(tag);
        self
    }

    /// Add a GPS sub-IFD. Each call adds its own GPS-Info pointer to IFD0.
    pub fn gps(mut self, tags: Vec<Tag>) -> Self {
        self.gps.push(tags);
        self
    }

    /// Put a non-Exif (XMP) APP1 segment in front of the Exif one.
    pub fn xmp_first(mut self) -> Self {
        self.xmp_first = true;
        self
    }

    pub fn build(self) -> Fixture {
        let order = self.order;

        let mut ifd0 = self.ifd0.clone();
        for _ in &self.gps {
            ifd0.push(Tag {
                tag: TAG_GPS_INFO,
                kind: 4,
                count: 1,
                data: order.u32(0).to_vec(),
            });
        }
        ifd0.sort_by_key(|t| t.tag);

        let mut next = 8 + ifd_size(&ifd0);
        let mut gps_offsets = Vec::new();
        for tags in &self.gps {
            gps_offsets.push(next);
            next += ifd_size(tags);
        }
        let pointers = ifd0.iter_mut().filter(|t| t.tag == TAG_GPS_INFO);
        for (t, &offset) in pointers.zip(&gps_offsets) {
            t.data = order.u32(offset as u32).to_vec();
        }

        let mut tiff = Vec::new();
        tiff.extend_from_slice(&order.marker());
        tiff.extend_from_slice(&order.u16(42));
        tiff.extend_from_slice(&order.u32(8));
        let ifd0_rel = write_ifd(&mut tiff, &ifd0, order);
        let mut gps_rel = Vec::new();
        for (tags, &offset) in self.gps.iter().zip(&gps_offsets) {
            assert_eq!(tiff.len(), offset);
            gps_rel.extend(write_ifd(&mut tiff, tags, order));
        }

        let mut out = vec![0xFF, 0xD8];
        push_segment(&mut out, 0xFFE0, b"JFIF\0\x01\x01\0\0\x01\0\x01\0\0");
        if self.xmp_first {
            push_segment(
                &mut out,
                0xFFE1,
                b"http://ns.adobe.com/xap/1.0/\0<x:xmpmeta xmlns:x=\"adobe:ns:meta/\"/>",
            );
        }
        let mut exif = b"Exif\0\0".to_vec();
        exif.extend_from_slice(&tiff);
        let tiff_start = out.len() + 4 + 6;
        push_segment(&mut out, 0xFFE1, &exif);

        // SOS header, one component
        push_segment(&mut out, 0xFFDA, &[0x01, 0x01, 0x00, 0x00, 0x3F, 0x00]);
        let scan_start = out.len();
        out.extend((0..96u32).map(|i| (i * 37 % 251) as u8));
        let scan_data = scan_start..out.len();
        out.extend_from_slice(&[0xFF, 0xD9]);

        let shift = |v: Vec<(u16, Range<usize>)>| -> Vec<(u16, Range<usize>)> {
            v.into_iter()
                .map(|(t, r)| (t, r.start + tiff_start..r.end + tiff_start))
                .collect()
        };

        Fixture {
            bytes: out,
            order,
            tiff_start,
            ifd0_values: shift(ifd0_rel),
            gps_values: shift(gps_rel),
            scan_data,
        }
    }
}

fn push_segment(out: &mut Vec<u8>, marker: u16, payload: &[u8]) {
    out.extend_from_slice(&marker.to_be_bytes());
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(payload);
}

fn padded(len: usize) -> usize {
    len + len % 2
}

fn ifd_size(entries: &[Tag]) -> usize {
    let data: usize = entries
        .iter()
        .filter(|t| t.data.len() > 4)
        .map(|t| padded(t.data.len()))
        .sum();
    2 + entries.len() * 12 + 4 + data
}

/// Append an IFD plus its value area; returns value ranges relative to the
/// TIFF header.
fn write_ifd(tiff: &mut Vec<u8>, entries: &[Tag], order: Order) -> Vec<(u16, Range<usize>)> {
    let data_base = tiff.len() + 2 + entries.len() * 12 + 4;
    let mut data = Vec::new();
    let mut ranges = Vec::new();

    tiff.extend_from_slice(&order.u16(entries.len() as u16));
    for e in entries {
        tiff.extend_from_slice(&order.u16(e.tag));
        tiff.extend_from_slice(&order.u16(e.kind));
        tiff.extend_from_slice(&order.u32(e.count));
        if e.data.len() <= 4 {
            let field = tiff.len();
            let mut v = e.data.clone();
            v.resize(4, 0);
            tiff.extend_from_slice(&v);
            ranges.push((e.tag, field..field + 4));
        } else {
            let at = data_base + data.len();
            tiff.extend_from_slice(&order.u32(at as u32));
            ranges.push((e.tag, at..at + e.data.len()));
            data.extend_from_slice(&e.data);
            if e.data.len() % 2 == 1 {
                data.push(0);
            }
        }
    }
    tiff.extend_from_slice(&order.u32(0));
    tiff.extend_from_slice(&data);
    ranges
}

/// The GPS block of a typical phone photo.
pub fn phone_gps(order: Order) -> Vec<Tag> {
    vec![
        Tag::bytes(gps::VERSION_ID, &[2, 3, 0, 0]),
        Tag::ascii(gps::LATITUDE_REF, b"N\0"),
        Tag::rationals(gps::LATITUDE, &[(40, 1), (26, 1), (4628, 100)], order),
        Tag::ascii(gps::LONGITUDE_REF, b"W\0"),
        Tag::rationals(gps::LONGITUDE, &[(79, 1), (58, 1), (5616, 100)], order),
        Tag::bytes(gps::ALTITUDE_REF, &[0]),
        Tag::rationals(gps::ALTITUDE, &[(31415, 100)], order),
        Tag::rationals(gps::TIME_STAMP, &[(14, 1), (3, 1), (27, 1)], order),
        Tag::ascii(gps::MAP_DATUM, b"WGS-84\0"),
        Tag::srationals(gps::DEST_BEARING, &[(-2715, 10)], order),
        Tag::undefined(gps::PROCESSING_METHOD, b"ASCII\0\0\0GPS"),
        Tag::ascii(gps::DATE_STAMP, b"2024:05:01\0"),
    ]
}

/// A phone-like JPEG with Make, DateTimeOriginal and a full GPS block.
pub fn phone_photo(order: Order) -> Fixture {
    Builder::new(order)
        .ifd0(Tag::ascii(TAG_MAKE, b"Canon\0"))
        .ifd0(Tag::ascii(TAG_DATE_TIME_ORIGINAL, b"2024:05:01 14:03:27\0"))
        .ifd0(Tag::short(0x0112, 1, order))
        .gps(phone_gps(order))
        .build()
}
