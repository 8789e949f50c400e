//! # ICO 容器组装模块
//!
//! ## 设计思路
//!
//! ICO 文件由三段组成，全部小端序：
//!
//! ```text
//! ┌──────────────┬──────────────────────────┬──────────────────────────┐
//! │ 文件头 6B    │ 目录 16B x count         │ 载荷（按目录顺序紧密拼接）│
//! │ 0 / 1 / count│ w h 0 0 1 32 size offset │ PNG PNG PNG ...          │
//! └──────────────┴──────────────────────────┴──────────────────────────┘
//! ```
//!
//! 偏移量不存储在条目上，而是由 `payload_offsets` 在序列化时按前缀和计算，
//! 条目重排后不会残留过期偏移。
//!
//! ## 实现思路
//!
//! - `payload_offsets` 是独立纯函数，可单独测试
//! - `build` 先计算偏移，再用 `byteorder` 依次写入头、目录、载荷
//! - `IconDirectory::parse` 反向读取头和目录，供 `inspect` 与测试使用

use std::io::{self, Cursor, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::source::{validate_size, MAX_ICON_SIZE};
use super::FaviconError;

pub const HEADER_LEN: usize = 6;
pub const DIR_ENTRY_LEN: usize = 16;
pub const MAX_ENTRIES: usize = u16::MAX as usize;

const RESOURCE_TYPE_ICON: u16 = 1;
const COLOR_PLANES: u16 = 1;
const BITS_PER_PIXEL: u16 = 32;

/// 单个尺寸的图标条目：尺寸 + 已编码载荷。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconEntry {
    pub size: u32,
    pub payload: Vec<u8>,
}

impl IconEntry {
    pub fn new(size: u32, payload: Vec<u8>) -> Self {
        Self { size, payload }
    }
}

/// 按目录顺序计算每个载荷的起始偏移。
///
/// 第 `i` 个偏移 = 文件头 + 目录 + 前 `i` 个载荷长度之和。
///
/// # 示例
/// ```rust
/// use favicon_packager::favicon::payload_offsets;
///
/// let offsets = payload_offsets(&[100, 400, 900])?;
/// assert_eq!(offsets, vec![54, 154, 554]);
/// # Ok::<(), favicon_packager::favicon::FaviconError>(())
/// ```
pub fn payload_offsets(payload_lens: &[usize]) -> Result<Vec<u32>, FaviconError> {
    if payload_lens.is_empty() {
        return Err(FaviconError::EmptyEntrySet);
    }
    if payload_lens.len() > MAX_ENTRIES {
        return Err(FaviconError::TooManyEntries(payload_lens.len()));
    }

    let mut cursor = HEADER_LEN + DIR_ENTRY_LEN * payload_lens.len();
    let mut offsets = Vec::with_capacity(payload_lens.len());

    for &len in payload_lens {
        let offset = u32::try_from(cursor)
            .map_err(|_| FaviconError::PayloadTooLarge(format!("载荷偏移 {} 超出 32 位", cursor)))?;
        offsets.push(offset);
        cursor = cursor
            .checked_add(len)
            .ok_or_else(|| FaviconError::PayloadTooLarge("载荷总长度溢出".to_string()))?;
    }

    u32::try_from(cursor)
        .map_err(|_| FaviconError::PayloadTooLarge(format!("容器总长度 {} 超出 32 位", cursor)))?;

    Ok(offsets)
}

/// 目录宽高字段编码：256 写为 0，其余写字面值。
fn encode_dimension(size: u32) -> Result<u8, FaviconError> {
    validate_size(size)?;
    if size == MAX_ICON_SIZE {
        Ok(0)
    } else {
        Ok(size as u8)
    }
}

fn decode_dimension(value: u8) -> u32 {
    if value == 0 {
        MAX_ICON_SIZE
    } else {
        u32::from(value)
    }
}

/// 将有序条目序列组装为 ICO 字节。
///
/// 载荷内容不做校验，空载荷同样会生成结构合法的容器。
pub fn build(entries: &[IconEntry]) -> Result<Vec<u8>, FaviconError> {
    let lens: Vec<usize> = entries.iter().map(|entry| entry.payload.len()).collect();
    let offsets = payload_offsets(&lens)?;
    let dimensions = entries
        .iter()
        .map(|entry| encode_dimension(entry.size))
        .collect::<Result<Vec<u8>, _>>()?;

    let total_len = HEADER_LEN + DIR_ENTRY_LEN * entries.len() + lens.iter().sum::<usize>();
    let mut out = Vec::with_capacity(total_len);

    write_container(&mut out, entries, &dimensions, &offsets)
        .map_err(|e| FaviconError::InvalidFormat(format!("写入 ICO 缓冲失败：{}", e)))?;

    debug_assert_eq!(out.len(), total_len);
    Ok(out)
}

fn write_container<W: Write>(
    mut writer: W,
    entries: &[IconEntry],
    dimensions: &[u8],
    offsets: &[u32],
) -> io::Result<()> {
    writer.write_u16::<LittleEndian>(0)?; // reserved
    writer.write_u16::<LittleEndian>(RESOURCE_TYPE_ICON)?;
    writer.write_u16::<LittleEndian>(entries.len() as u16)?;

    for ((entry, &dimension), &offset) in entries.iter().zip(dimensions).zip(offsets) {
        writer.write_u8(dimension)?;
        writer.write_u8(dimension)?;
        writer.write_u8(0)?; // color count
        writer.write_u8(0)?; // reserved
        writer.write_u16::<LittleEndian>(COLOR_PLANES)?;
        writer.write_u16::<LittleEndian>(BITS_PER_PIXEL)?;
        writer.write_u32::<LittleEndian>(entry.payload.len() as u32)?;
        writer.write_u32::<LittleEndian>(offset)?;
    }

    for entry in entries {
        writer.write_all(&entry.payload)?;
    }

    Ok(())
}

/// 从 ICO 字节读回的目录记录。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryRecord {
    /// 实际尺寸（目录中的 0 已还原为 256）。
    pub width: u32,
    pub height: u32,
    pub color_count: u8,
    pub planes: u16,
    pub bits_per_pixel: u16,
    pub payload_size: u32,
    pub payload_offset: u32,
}

/// 已解析的 ICO 头与目录。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconDirectory {
    pub resource_type: u16,
    pub records: Vec<DirectoryRecord>,
}

impl IconDirectory {
    /// 解析文件头与目录，并校验每个载荷区间都落在缓冲范围内。
    pub fn parse(bytes: &[u8]) -> Result<Self, FaviconError> {
        Self::read_from(bytes).map_err(|e| match e {
            ParseError::Io(io) => FaviconError::MalformedContainer(format!("数据被截断：{}", io)),
            ParseError::Invalid(err) => err,
        })
    }

    fn read_from(bytes: &[u8]) -> Result<Self, ParseError> {
        let mut reader = Cursor::new(bytes);

        let reserved = reader.read_u16::<LittleEndian>()?;
        if reserved != 0 {
            return Err(malformed(format!("保留字段非 0：{}", reserved)));
        }
        let resource_type = reader.read_u16::<LittleEndian>()?;
        if resource_type != RESOURCE_TYPE_ICON && resource_type != 2 {
            return Err(malformed(format!("未知资源类型：{}", resource_type)));
        }
        let count = reader.read_u16::<LittleEndian>()? as usize;

        let mut records = Vec::with_capacity(count);
        for _ in 0..count {
            let width = decode_dimension(reader.read_u8()?);
            let height = decode_dimension(reader.read_u8()?);
            let color_count = reader.read_u8()?;
            let _reserved = reader.read_u8()?;
            let planes = reader.read_u16::<LittleEndian>()?;
            let bits_per_pixel = reader.read_u16::<LittleEndian>()?;
            let payload_size = reader.read_u32::<LittleEndian>()?;
            let payload_offset = reader.read_u32::<LittleEndian>()?;

            let end = u64::from(payload_offset) + u64::from(payload_size);
            if end > bytes.len() as u64 {
                return Err(malformed(format!(
                    "载荷区间越界：{}+{} > {}",
                    payload_offset,
                    payload_size,
                    bytes.len()
                )));
            }

            records.push(DirectoryRecord {
                width,
                height,
                color_count,
                planes,
                bits_per_pixel,
                payload_size,
                payload_offset,
            });
        }

        Ok(Self {
            resource_type,
            records,
        })
    }

    /// 取出第 `index` 个条目的载荷切片。
    pub fn payload<'a>(&self, bytes: &'a [u8], index: usize) -> Option<&'a [u8]> {
        let record = self.records.get(index)?;
        let start = record.payload_offset as usize;
        let end = start.checked_add(record.payload_size as usize)?;
        bytes.get(start..end)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

enum ParseError {
    Io(io::Error),
    Invalid(FaviconError),
}

impl From<io::Error> for ParseError {
    fn from(error: io::Error) -> Self {
        Self::Io(error)
    }
}

fn malformed(message: String) -> ParseError {
    ParseError::Invalid(FaviconError::MalformedContainer(message))
}
