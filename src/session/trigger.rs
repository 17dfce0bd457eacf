/// Case-insensitive substring match of any trigger phrase against a spoken line.
pub fn contains_trigger(transcript: &str, phrases: &[String]) -> bool {
    let haystack = transcript.to_lowercase();
    phrases
        .iter()
        .any(|phrase| !phrase.is_empty() && haystack.contains(&phrase.to_lowercase()))
}
