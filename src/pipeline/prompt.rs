use super::Stage;

/// Where a chunk sits in its sequence, which decides the article template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// The only chunk; the output has to stand alone
    Whole,
    Opening,
    Continuation,
    Closing,
}

impl Position {
    /// Position of the 1-based `ordinal` among `total` chunks
    pub fn of(ordinal: usize, total: usize) -> Self {
        if total <= 1 {
            Position::Whole
        } else if ordinal <= 1 {
            Position::Opening
        } else if ordinal >= total {
            Position::Closing
        } else {
            Position::Continuation
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Whole => "whole",
            Position::Opening => "opening",
            Position::Continuation => "continuation",
            Position::Closing => "closing",
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const DIALOGUE_INSTRUCTIONS: &str = "\
Analyze this excerpt of a video's subtitle file and rewrite it as a clear dialogue.
Separate the text by speaker and drop all sequence numbers and timestamps.
Use speaker names when they are mentioned; otherwise tell speakers apart from their
speech patterns and the context, without inventing placeholder labels.";

const ARTICLE_WHOLE_INSTRUCTIONS: &str = "\
Turn this complete interview transcript into a professional news article.
Open with a strong introduction, follow AP style guidelines throughout,
and finish with a clear conclusion.";

const ARTICLE_OPENING_INSTRUCTIONS: &str = "\
Turn this first part of an interview transcript into the beginning of a professional
news article. Open with a strong introduction and follow AP style guidelines.
Do not conclude the article; more parts will follow.";

const ARTICLE_CONTINUATION_INSTRUCTIONS: &str = "\
Continue the news article with this part of the interview transcript.
Keep the flow and the journalistic style of the previous parts, without a new introduction or a conclusion.";

const ARTICLE_CLOSING_INSTRUCTIONS: &str = "\
Conclude the news article with this final part of the interview transcript.
Keep the journalistic style and end with a strong closing.";

const CARRIED_CONTEXT_NOTE: &str = "\
The first lines of the part may repeat the end of the previous part for context;
do not write about them again.";

/// Instructions used for a stage at a position
pub fn instructions(stage: Stage, position: Position) -> &'static str {
    match stage {
        Stage::DialogueStructuring => DIALOGUE_INSTRUCTIONS,
        Stage::ArticleGeneration => match position {
            Position::Whole => ARTICLE_WHOLE_INSTRUCTIONS,
            Position::Opening => ARTICLE_OPENING_INSTRUCTIONS,
            Position::Continuation => ARTICLE_CONTINUATION_INSTRUCTIONS,
            Position::Closing => ARTICLE_CLOSING_INSTRUCTIONS,
        },
    }
}

/// Build the prompt for chunk `ordinal` of `total` in `stage`
pub fn build(stage: Stage, chunk_text: &str, ordinal: usize, total: usize) -> String {
    let position = Position::of(ordinal, total);
    let label = match stage {
        Stage::DialogueStructuring => "Subtitle excerpt",
        Stage::ArticleGeneration => "Transcript part",
    };

    let mut prompt = String::from(instructions(stage, position));
    if stage == Stage::ArticleGeneration
        && matches!(position, Position::Continuation | Position::Closing)
    {
        prompt.push('\n');
        prompt.push_str(CARRIED_CONTEXT_NOTE);
    }

    prompt.push_str("\n\n");
    prompt.push_str(label);
    prompt.push_str(":\n");
    prompt.push_str(chunk_text);
    prompt
}
