//! SoundFont 2 结构预检
//!
//! rustysynth按pdta中的索引直接切片，索引越界时会panic。
//! 交给rustysynth之前按它的读取顺序（INFO → sdta → pdta）遍历一遍RIFF块，
//! 校验所有块长度与bag/生成器索引，不合法时返回 `InvalidMidiData`。

use crate::error::{self, SoundError, SoundResult};

/// 各记录长度（字节）
const PHDR_RECORD: usize = 38;
const INST_RECORD: usize = 22;
const BAG_RECORD: usize = 4;
const GEN_RECORD: usize = 4;

/// phdr记录中bag索引的偏移（名称20 + 音色号2 + 音色库2）
const PHDR_BAG_OFFSET: usize = 24;
/// inst记录中bag索引的偏移（名称20）
const INST_BAG_OFFSET: usize = 20;

/// RIFF头（"RIFF" + 长度 + "sfbk"）
const RIFF_HEADER: usize = 12;

fn invalid(detail: impl std::fmt::Display) -> SoundError {
    error::invalid_midi("SoundFont结构无效", detail)
}

fn fourcc(id: &[u8]) -> String {
    String::from_utf8_lossy(id).into_owned()
}

/// 切出一个块，返回 (id, 数据, 剩余字节)
fn take_chunk(bytes: &[u8]) -> SoundResult<(&[u8], &[u8], &[u8])> {
    let Some((header, rest)) = bytes.split_first_chunk::<8>() else {
        return Err(invalid(format!("块头被截断（剩余{}字节）", bytes.len())));
    };
    let size = u32::from_le_bytes([header[4], header[5], header[6], header[7]]) as usize;
    if size > rest.len() {
        return Err(invalid(format!(
            "块 {} 长度越界: {size} > {}",
            fourcc(&header[..4]),
            rest.len()
        )));
    }
    let (data, tail) = rest.split_at(size);
    Ok((&header[..4], data, tail))
}

/// 切出指定类型的LIST块，返回 (子块区域, 剩余字节)
fn take_list<'a>(bytes: &'a [u8], list_type: &[u8; 4]) -> SoundResult<(&'a [u8], &'a [u8])> {
    let (id, data, rest) = take_chunk(bytes)?;
    if id != b"LIST" || data.get(..4) != Some(list_type.as_slice()) {
        return Err(invalid(format!("缺少 LIST {}", fourcc(list_type))));
    }
    Ok((&data[4..], rest))
}

/// 逐个访问LIST中的子块；子块必须恰好填满LIST
fn for_each_sub_chunk<'a>(
    mut body: &'a [u8],
    mut visit: impl FnMut(&'a [u8], &'a [u8]) -> SoundResult<()>,
) -> SoundResult<()> {
    while !body.is_empty() {
        let (id, data, rest) = take_chunk(body)?;
        visit(id, data)?;
        body = rest;
    }
    Ok(())
}

fn index_at(record: &[u8], offset: usize) -> usize {
    u16::from_le_bytes([record[offset], record[offset + 1]]) as usize
}

/// 记录表：非空且长度为记录大小的整数倍
fn records<'a>(name: &str, data: Option<&'a [u8]>, record: usize) -> SoundResult<&'a [u8]> {
    match data {
        Some(data) if !data.is_empty() && data.len() % record == 0 => Ok(data),
        Some(data) => Err(invalid(format!("{name} 长度{}不是{record}的整数倍", data.len()))),
        None => Err(invalid(format!("缺少 {name} 子块"))),
    }
}

/// 校验bag表并返回区域数（不含终止bag）
///
/// bag中的生成器索引单调不减，且不超过生成器数（不含终止生成器）。
fn check_bags(name: &str, bags: &[u8], generators: &[u8]) -> SoundResult<usize> {
    let generator_count = generators.len() / GEN_RECORD - 1;
    let mut previous = 0;
    for (i, record) in bags.chunks_exact(BAG_RECORD).enumerate() {
        let index = index_at(record, 0);
        if index < previous {
            return Err(invalid(format!("{name}[{i}] 生成器索引递减: {index} < {previous}")));
        }
        if index > generator_count {
            return Err(invalid(format!(
                "{name}[{i}] 生成器索引越界: {index} > {generator_count}"
            )));
        }
        previous = index;
    }
    Ok(bags.len() / BAG_RECORD - 1)
}

/// 预设/乐器头中的bag起始索引不超过区域数
fn check_headers(
    name: &str,
    headers: &[u8],
    record: usize,
    offset: usize,
    zone_count: usize,
) -> SoundResult<()> {
    for (i, header) in headers.chunks_exact(record).enumerate() {
        let start = index_at(header, offset);
        if start > zone_count {
            return Err(invalid(format!("{name}[{i}] 区域索引越界: {start} > {zone_count}")));
        }
    }
    Ok(())
}

/// 校验完整的SoundFont 2字节流（调用方已确认 RIFF/sfbk 头）
pub(super) fn validate(bytes: &[u8]) -> SoundResult<()> {
    let body = bytes.get(RIFF_HEADER..).unwrap_or_default();

    let (info, rest) = take_list(body, b"INFO")?;
    for_each_sub_chunk(info, |id, data| match id {
        // 版本块按固定4字节读取
        b"ifil" | b"iver" if data.len() != 4 => Err(invalid(format!(
            "{} 长度应为4: {}",
            fourcc(id),
            data.len()
        ))),
        _ => Ok(()),
    })?;

    let (sdta, rest) = take_list(rest, b"sdta")?;
    for_each_sub_chunk(sdta, |id, data| match id {
        b"smpl" if data.len() % 2 != 0 => {
            Err(invalid(format!("smpl 长度不是偶数: {}", data.len())))
        }
        _ => Ok(()),
    })?;

    let (pdta, _) = take_list(rest, b"pdta")?;
    let mut phdr = None;
    let mut pbag = None;
    let mut pgen = None;
    let mut inst = None;
    let mut ibag = None;
    let mut igen = None;
    for_each_sub_chunk(pdta, |id, data| {
        match id {
            b"phdr" => phdr = Some(data),
            b"pbag" => pbag = Some(data),
            b"pgen" => pgen = Some(data),
            b"inst" => inst = Some(data),
            b"ibag" => ibag = Some(data),
            b"igen" => igen = Some(data),
            _ => {}
        }
        Ok(())
    })?;

    let phdr = records("phdr", phdr, PHDR_RECORD)?;
    let pbag = records("pbag", pbag, BAG_RECORD)?;
    let pgen = records("pgen", pgen, GEN_RECORD)?;
    let inst = records("inst", inst, INST_RECORD)?;
    let ibag = records("ibag", ibag, BAG_RECORD)?;
    let igen = records("igen", igen, GEN_RECORD)?;

    let instrument_zones = check_bags("ibag", ibag, igen)?;
    check_headers("inst", inst, INST_RECORD, INST_BAG_OFFSET, instrument_zones)?;
    let preset_zones = check_bags("pbag", pbag, pgen)?;
    check_headers("phdr", phdr, PHDR_RECORD, PHDR_BAG_OFFSET, preset_zones)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(id: &[u8; 4], data: &[u8]) -> Vec<u8> {
        let mut bytes = id.to_vec();
        bytes.extend_from_slice(&(data.len() as u32).to_le_bytes());
        bytes.extend_from_slice(data);
        bytes
    }

    fn bags(indices: &[u16]) -> Vec<u8> {
        indices
            .iter()
            .flat_map(|i| [i.to_le_bytes(), [0, 0]].concat())
            .collect()
    }

    #[test]
    fn test_take_chunk_rejects_overlong_size() {
        let mut bytes = b"smpl".to_vec();
        bytes.extend_from_slice(&100u32.to_le_bytes());
        bytes.extend_from_slice(&[0; 10]);
        assert!(take_chunk(&bytes).is_err());
        assert!(take_chunk(b"smp").is_err());

        let ok = chunk(b"smpl", &[1, 2]);
        let (id, data, rest) = take_chunk(&ok).unwrap();
        assert_eq!(id, b"smpl");
        assert_eq!(data, &[1, 2]);
        assert!(rest.is_empty());
    }

    #[test]
    fn test_check_bags() {
        let generators = vec![0u8; GEN_RECORD * 3];
        assert_eq!(check_bags("ibag", &bags(&[0, 1, 2]), &generators).unwrap(), 2);
        // 指向终止生成器之后
        assert!(check_bags("ibag", &bags(&[0, 3]), &generators).is_err());
        // 递减
        assert!(check_bags("ibag", &bags(&[1, 0, 2]), &generators).is_err());
    }

    #[test]
    fn test_check_headers() {
        let mut inst = vec![0u8; INST_RECORD * 2];
        inst[INST_RECORD + INST_BAG_OFFSET] = 1;
        assert!(check_headers("inst", &inst, INST_RECORD, INST_BAG_OFFSET, 1).is_ok());
        inst[INST_RECORD + INST_BAG_OFFSET] = 2;
        assert!(check_headers("inst", &inst, INST_RECORD, INST_BAG_OFFSET, 1).is_err());
    }

    #[test]
    fn test_odd_sample_data_rejected() {
        let mut bytes = b"RIFF\0\0\0\0sfbk".to_vec();
        bytes.extend(chunk(b"LIST", b"INFO"));
        bytes.extend(chunk(b"LIST", &[b"sdta".as_slice(), chunk(b"smpl", &[0; 3]).as_slice()].concat()));
        let err = validate(&bytes).unwrap_err();
        assert!(matches!(err, SoundError::InvalidMidiData(_)));
        assert!(err.to_string().contains("smpl"));
    }
}
