const PERSONA: &str = "You are an expert study buddy.";

/// Instruction sent alongside a photographed question.
pub fn image_prompt() -> String {
    format!(
        "{PERSONA}\n\
         1. Analyze the image and extract the homework question text exactly (OCR).\n\
         2. Explain the homework question step-by-step in a simple, clear way that a beginner student can understand.\n\n\
         Return the result in JSON format with \"transcription\" and \"explanation\" fields."
    )
}

/// Instruction for a typed or dictated question.
pub fn text_prompt(question: &str) -> String {
    format!(
        "{PERSONA}\n\
         The student has asked the following question: \"{}\"\n\n\
         Explain this question step-by-step in a simple, clear way that a beginner student can understand.\n\n\
         Return the result in JSON format with \"transcription\" (the original question) and \"explanation\" fields.",
        question.trim()
    )
}
