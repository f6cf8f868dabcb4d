//! Prompt construction for the text, image and speech providers.

use crate::external::{StoryRequest, StoryText};

/// OpenAI `/audio/speech` 单次输入上限
pub const MAX_SPEECH_INPUT_CHARS: usize = 4096;

pub const STORY_SYSTEM_PROMPT: &str = "You are a children's story writer. \
Write warm, age-appropriate stories. Respond only with a JSON object with the keys \
\"title\", \"content\" and \"moral\".";

pub const TRANSLATION_SYSTEM_PROMPT: &str = "You are a literary translator for children's \
stories. Preserve tone and meaning. Respond only with a JSON object with the keys \
\"title\", \"content\" and \"moral\".";

pub fn story_prompt(request: &StoryRequest) -> String {
    let mut prompt = format!(
        "Write a {genre} story for children aged {age} in the language \"{lang}\" about: {topic}.",
        genre = request.genre,
        age = request.age_group,
        lang = request.language,
        topic = request.prompt.trim(),
    );
    if let Some(characters) = request.characters.as_deref().filter(|s| !s.trim().is_empty()) {
        prompt.push_str(&format!("\nMain characters: {}.", characters.trim()));
    }
    if let Some(setting) = request.setting.as_deref().filter(|s| !s.trim().is_empty()) {
        prompt.push_str(&format!("\nSetting: {}.", setting.trim()));
    }
    match request.moral.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(moral) => prompt.push_str(&format!("\nThe story should teach: {}.", moral.trim())),
        None => prompt.push_str("\nEnd with a clear moral."),
    }
    prompt
}

pub fn translation_prompt(story: &StoryText, target_language: &str) -> String {
    format!(
        "Translate the following story into \"{target_language}\".\n\nTitle: {}\n\nStory:\n{}\n\nMoral: {}",
        story.title, story.content, story.moral
    )
}

pub fn image_prompt(prompt: &str, style: Option<&str>) -> String {
    match style.map(str::trim).filter(|s| !s.is_empty()) {
        Some(style) => format!("{}, {style} style, children's book illustration", prompt.trim()),
        None => format!("{}, children's book illustration", prompt.trim()),
    }
}

/// 朗读文本：标题 + 正文 + 寓意，超过上限时按字符截断
pub fn narration_text(story: &StoryText) -> String {
    let full = format!("{}.\n\n{}\n\n{}", story.title, story.content, story.moral);
    if full.chars().count() <= MAX_SPEECH_INPUT_CHARS {
        return full;
    }
    full.chars().take(MAX_SPEECH_INPUT_CHARS).collect()
}
