//! 자동완성/"did you mean" 추천용 퍼지 랭커.
//!
//! 점수는 0이 최선이며, 규칙은 위에서부터 처음 일치하는 것을 사용한다.

const SEGMENT_SEPARATOR: char = '-';

/// 후보 문자열과 입력 힌트의 유사도 점수.
/// 1) 하이픈 세그먼트 약어 일치(`gf` → `get-file`) = 0
/// 2) 세그먼트(또는 전체) 접두사 일치 = 0
/// 3) 접미사 일치 = 1
/// 4) 그 외 Levenshtein 거리
pub fn rank(candidate: &str, hint: &str) -> usize {
    let candidate_lower = candidate.to_lowercase();
    let hint_lower = hint.to_lowercase();
    let segments: Vec<&str> = candidate_lower.split(SEGMENT_SEPARATOR).collect();

    if matches_acronym(&segments, &hint_lower) {
        return 0;
    }

    if candidate_lower.starts_with(&hint_lower)
        || segments.iter().any(|segment| segment.starts_with(&hint_lower))
    {
        return 0;
    }

    if candidate_lower.ends_with(&hint_lower) {
        return 1;
    }

    levenshtein(&hint_lower, &candidate_lower)
}

/// 후보들을 점수 오름차순(동점이면 짧은 순)으로 정렬한다.
/// 점수가 후보 길이 이상인 항목은 관련 없는 것으로 보고 제외한다.
pub fn rank_all<I, S>(candidates: I, hint: &str) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut scored: Vec<(usize, usize, String)> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let candidate = candidate.as_ref();
            let len = candidate.chars().count();
            let score = rank(candidate, hint);
            (score < len).then(|| (score, len, candidate.to_string()))
        })
        .collect();

    scored.sort_by_key(|(score, len, _)| (*score, *len));
    scored.into_iter().map(|(_, _, candidate)| candidate).collect()
}

fn matches_acronym(segments: &[&str], hint: &str) -> bool {
    if segments.len() < 2 || hint.is_empty() {
        return false;
    }

    let hint_chars: Vec<char> = hint.chars().collect();
    if hint_chars.len() > segments.len() {
        return false;
    }

    hint_chars
        .iter()
        .zip(segments)
        .all(|(ch, segment)| segment.starts_with(*ch))
}

/// 문자 단위 Levenshtein 편집 거리.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}
