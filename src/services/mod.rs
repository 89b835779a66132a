// Services module
// Contains business logic separated by domain areas

pub mod align;    // Forced alignment and subtitle generation
pub mod llm;      // Language-model story generation
pub mod pipeline; // Pipeline orchestration
pub mod story;    // Story persistence boundary
pub mod text;     // Narration text normalization
pub mod tts;      // Text-to-Speech services
pub mod video;    // Video compositing services
