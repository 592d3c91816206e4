//! 候选释义去重：相同 (词性, 释义) 只保留第一次出现，其余保持网关给出的相关度顺序

use std::collections::HashSet;

use crate::dictionary::CandidateSense;

/// 纯函数，无 I/O；空输入得空输出，对已规整的列表幂等
pub fn normalize(senses: Vec<CandidateSense>) -> Vec<CandidateSense> {
    let mut seen: HashSet<(String, String)> = HashSet::with_capacity(senses.len());
    senses
        .into_iter()
        .filter(|s| seen.insert((s.part_of_speech.clone(), s.gloss.clone())))
        .collect()
}
