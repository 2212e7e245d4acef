//! Named binary tag trees as stored in `.schem` and `.litematic` files.
//!
//! This crate only materializes the tree. Interpreting the tree as voxels is
//! the job of `schemview-format`.

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::collections::HashMap;
use std::io::{self, BufRead, BufReader, Read, Write};

pub type Compound = HashMap<String, Tag>;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    End,
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    /// Raw bytes. The on-disk type is signed, but every consumer here wants
    /// unsigned octets (varint streams), so they are kept as `u8`.
    ByteArray(Vec<u8>),
    String(String),
    List(Vec<Tag>),
    Compound(Compound),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

fn invalid_data(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

fn read_len<R: Read>(reader: &mut R) -> io::Result<usize> {
    let len = reader.read_i32::<BigEndian>()?;
    usize::try_from(len).map_err(|_| invalid_data(format!("Negative array length: {}", len)))
}

/// Elements read per step of an array payload.
const ARRAY_CHUNK: usize = 4096;

/// Reads `len` elements, growing the buffer as data arrives so a bogus
/// length hits EOF before it can demand a huge allocation.
fn read_array<R, T, F>(reader: &mut R, len: usize, mut read_into: F) -> io::Result<Vec<T>>
where
    R: Read,
    T: Default + Clone,
    F: FnMut(&mut R, &mut [T]) -> io::Result<()>,
{
    let mut values = Vec::with_capacity(len.min(ARRAY_CHUNK));
    while values.len() < len {
        let start = values.len();
        values.resize(start + (len - start).min(ARRAY_CHUNK), T::default());
        read_into(reader, &mut values[start..])?;
    }
    Ok(values)
}

fn read_utf8<R: Read>(reader: &mut R) -> io::Result<String> {
    let len = reader.read_u16::<BigEndian>()? as usize;
    let mut bytes = vec![0u8; len];
    reader.read_exact(&mut bytes)?;
    String::from_utf8(bytes).map_err(|e| invalid_data(e.to_string()))
}

fn write_utf8<W: Write>(writer: &mut W, value: &str) -> io::Result<()> {
    let len = u16::try_from(value.len())
        .map_err(|_| invalid_data(format!("String too long: {} bytes", value.len())))?;
    writer.write_u16::<BigEndian>(len)?;
    writer.write_all(value.as_bytes())
}

impl Tag {
    pub fn type_id(&self) -> u8 {
        match self {
            Tag::End => 0,
            Tag::Byte(_) => 1,
            Tag::Short(_) => 2,
            Tag::Int(_) => 3,
            Tag::Long(_) => 4,
            Tag::Float(_) => 5,
            Tag::Double(_) => 6,
            Tag::ByteArray(_) => 7,
            Tag::String(_) => 8,
            Tag::List(_) => 9,
            Tag::Compound(_) => 10,
            Tag::IntArray(_) => 11,
            Tag::LongArray(_) => 12,
        }
    }

    /// Builds a compound from `(key, tag)` pairs.
    pub fn compound<K, I>(entries: I) -> Tag
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Tag)>,
    {
        Tag::Compound(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Reads one named tag (type id, name, payload).
    pub fn read<R: Read>(reader: &mut R) -> io::Result<(String, Tag)> {
        let type_id = reader.read_u8()?;
        if type_id == 0 {
            return Ok((String::new(), Tag::End));
        }
        let name = read_utf8(reader)?;
        let tag = Tag::read_payload(reader, type_id)?;
        Ok((name, tag))
    }

    fn read_payload<R: Read>(reader: &mut R, type_id: u8) -> io::Result<Tag> {
        let tag = match type_id {
            0 => Tag::End,
            1 => Tag::Byte(reader.read_i8()?),
            2 => Tag::Short(reader.read_i16::<BigEndian>()?),
            3 => Tag::Int(reader.read_i32::<BigEndian>()?),
            4 => Tag::Long(reader.read_i64::<BigEndian>()?),
            5 => Tag::Float(reader.read_f32::<BigEndian>()?),
            6 => Tag::Double(reader.read_f64::<BigEndian>()?),
            7 => {
                let len = read_len(reader)?;
                Tag::ByteArray(read_array(reader, len, |r: &mut R, buf: &mut [u8]| {
                    r.read_exact(buf)
                })?)
            }
            8 => Tag::String(read_utf8(reader)?),
            9 => {
                let item_type = reader.read_u8()?;
                let len = read_len(reader)?;
                let mut items = Vec::with_capacity(len.min(4096));
                for _ in 0..len {
                    items.push(Tag::read_payload(reader, item_type)?);
                }
                Tag::List(items)
            }
            10 => {
                let mut compound = Compound::new();
                loop {
                    let (name, tag) = Tag::read(reader)?;
                    if tag == Tag::End {
                        break;
                    }
                    compound.insert(name, tag);
                }
                Tag::Compound(compound)
            }
            11 => {
                let len = read_len(reader)?;
                Tag::IntArray(read_array(reader, len, |r: &mut R, buf: &mut [i32]| {
                    r.read_i32_into::<BigEndian>(buf)
                })?)
            }
            12 => {
                let len = read_len(reader)?;
                Tag::LongArray(read_array(reader, len, |r: &mut R, buf: &mut [i64]| {
                    r.read_i64_into::<BigEndian>(buf)
                })?)
            }
            _ => return Err(invalid_data(format!("Invalid tag type: {}", type_id))),
        };
        Ok(tag)
    }

    pub fn write<W: Write>(&self, writer: &mut W, name: &str) -> io::Result<()> {
        writer.write_u8(self.type_id())?;
        if *self != Tag::End {
            write_utf8(writer, name)?;
        }
        self.write_payload(writer)
    }

    fn write_payload<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        match self {
            Tag::End => Ok(()),
            Tag::Byte(v) => writer.write_i8(*v),
            Tag::Short(v) => writer.write_i16::<BigEndian>(*v),
            Tag::Int(v) => writer.write_i32::<BigEndian>(*v),
            Tag::Long(v) => writer.write_i64::<BigEndian>(*v),
            Tag::Float(v) => writer.write_f32::<BigEndian>(*v),
            Tag::Double(v) => writer.write_f64::<BigEndian>(*v),
            Tag::ByteArray(v) => {
                writer.write_i32::<BigEndian>(v.len() as i32)?;
                writer.write_all(v)
            }
            Tag::String(v) => write_utf8(writer, v),
            Tag::List(items) => {
                // An empty list is typed TAG_End
                writer.write_u8(items.first().map_or(0, Tag::type_id))?;
                writer.write_i32::<BigEndian>(items.len() as i32)?;
                for item in items {
                    item.write_payload(writer)?;
                }
                Ok(())
            }
            Tag::Compound(entries) => {
                for (name, tag) in entries {
                    tag.write(writer, name)?;
                }
                Tag::End.write(writer, "")
            }
            Tag::IntArray(v) => {
                writer.write_i32::<BigEndian>(v.len() as i32)?;
                v.iter()
                    .try_for_each(|&i| writer.write_i32::<BigEndian>(i))
            }
            Tag::LongArray(v) => {
                writer.write_i32::<BigEndian>(v.len() as i32)?;
                v.iter()
                    .try_for_each(|&l| writer.write_i64::<BigEndian>(l))
            }
        }
    }

    /// Looks up a direct child of a compound.
    pub fn get(&self, key: &str) -> Option<&Tag> {
        self.as_compound()?.get(key)
    }

    /// Follows a `/`-separated path of compound keys, e.g. `"Metadata/Name"`.
    pub fn get_path(&self, path: &str) -> Option<&Tag> {
        path.split('/').try_fold(self, |tag, key| tag.get(key))
    }

    pub fn as_compound(&self) -> Option<&Compound> {
        match self {
            Tag::Compound(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Tag]> {
        match self {
            Tag::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Tag::String(s) => Some(s),
            _ => None,
        }
    }

    /// Any integral tag widened to `i64`. Schematic writers disagree on
    /// whether dimensions and palette ids are Short or Int.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Tag::Byte(n) => Some(i64::from(*n)),
            Tag::Short(n) => Some(i64::from(*n)),
            Tag::Int(n) => Some(i64::from(*n)),
            Tag::Long(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_byte_array(&self) -> Option<&[u8]> {
        match self {
            Tag::ByteArray(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_long_array(&self) -> Option<&[i64]> {
        match self {
            Tag::LongArray(longs) => Some(longs),
            _ => None,
        }
    }
}

/// A root tag together with its (usually empty) name.
#[derive(Debug, Clone, PartialEq)]
pub struct NBTFile {
    pub name: String,
    pub root: Tag,
}

impl NBTFile {
    pub fn new(name: String, root: Tag) -> Self {
        NBTFile { name, root }
    }

    pub fn read<R: Read>(reader: &mut R) -> io::Result<Self> {
        let (name, root) = Tag::read(reader)?;
        Ok(NBTFile { name, root })
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.root.write(writer, &self.name)
    }

    pub fn read_gzip<R: Read>(reader: &mut R) -> io::Result<Self> {
        Self::read(&mut GzDecoder::new(reader))
    }

    pub fn write_gzip<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let mut encoder = GzEncoder::new(writer, Compression::default());
        self.write(&mut encoder)?;
        encoder.finish()?;
        Ok(())
    }

    /// Reads either a gzip-wrapped or an uncompressed tree, sniffing the
    /// gzip magic bytes.
    pub fn read_auto<R: Read>(reader: R) -> io::Result<Self> {
        let mut reader = BufReader::new(reader);
        let gzipped = reader.fill_buf()?.starts_with(&GZIP_MAGIC);
        if gzipped {
            Self::read_gzip(&mut reader)
        } else {
            Self::read(&mut reader)
        }
    }
}
