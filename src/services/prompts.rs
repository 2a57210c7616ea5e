//! 提示词构建 - 业务能力层
//!
//! 三种操作（生成 / 编辑 / 转换）共用同一种两段式结构：
//! 固定的 system 说明 + 嵌入用户输入的 user 说明。

use crate::models::Prompt;

/// 生成新章节的温度
pub const GENERATE_TEMPERATURE: f32 = 0.7;
/// 编辑、转换使用较低温度，尽量保持原文
pub const REWRITE_TEMPERATURE: f32 = 0.3;

const GENERATE_SYSTEM: &str = r"You are a professional LaTeX expert and academic writer. Generate high-quality, well-structured LaTeX content for academic documents.

REQUIREMENTS:
1. Write clean, publication-ready LaTeX code
2. Use proper academic writing style
3. Include relevant citations with realistic keys (format: \cite{author2023topic})
4. Add cross-references where appropriate (\ref{fig:name}, \ref{tab:name})
5. Use proper LaTeX environments for equations, figures, tables
6. Support both English and Persian text naturally
7. Don't include \section{} header - only content
8. Use professional academic vocabulary
9. Include at least 2-3 citations per substantial paragraph
10. Add TODO comments for figures/tables if needed

LATEX FORMATTING:
- Equations: \begin{equation}...\end{equation}
- Tables: \begin{table}[htbp]...\end{table}
- Figures: \begin{figure}[htbp]...\end{figure}
- Lists: \begin{itemize} or \begin{enumerate}
- Emphasis: \textbf{bold}, \textit{italic}
- References: \cite{realistic_key_2023}";

const EDIT_SYSTEM: &str = r"You are a professional LaTeX expert and academic editor. You will receive existing LaTeX content and instructions for improvement.

IMPROVEMENT GUIDELINES:
1. Maintain the existing structure and style
2. Enhance content based on the specific instructions
3. Keep all existing citations and references
4. Add new citations where appropriate (format: \cite{author2023topic})
5. Improve academic writing quality
6. Add relevant equations, figures, or tables if requested
7. Ensure proper LaTeX formatting
8. Don't change the overall structure unless specifically requested
9. Keep all existing cross-references (\ref{}, \cite{})
10. Support both English and Persian text naturally

OUTPUT: Return only the improved LaTeX code, nothing else.";

const CONVERT_SYSTEM: &str = r"You are a LaTeX formatting expert. Convert the given plain text to properly formatted LaTeX code.

CONVERSION RULES:
1. Preserve the original meaning and content
2. Add proper LaTeX formatting and structure
3. Convert lists to \begin{itemize} or \begin{enumerate}
4. Format equations properly with \begin{equation}
5. Add \textbf{} for emphasis where appropriate
6. Create tables for tabular data using \begin{tabular}
7. Add realistic citations with \cite{} where research references are mentioned
8. Use proper paragraph breaks
9. Don't add \section{} headers
10. Support Persian and English text seamlessly

OUTPUT: Only the formatted LaTeX code, nothing else.";

/// 生成新章节的提示词
pub fn generate_prompt(description: &str) -> Prompt {
    let user = format!(
        "Generate LaTeX content for a section about: {}

Make this content:
- Academically rigorous and well-researched
- Properly formatted with LaTeX commands
- Include relevant equations if applicable
- Add realistic citations
- Use clear section structure with subsections if needed
- Length: 300-500 words minimum",
        description
    );
    Prompt::new(GENERATE_SYSTEM, user, GENERATE_TEMPERATURE)
}

/// 改写已有章节的提示词
pub fn edit_prompt(current_content: &str, instruction: &str) -> Prompt {
    let user = format!(
        "Current LaTeX content:
{}

Improvement instructions: {}

Please improve this content according to the instructions while maintaining the existing structure and academic quality.",
        current_content, instruction
    );
    Prompt::new(EDIT_SYSTEM, user, REWRITE_TEMPERATURE)
}

/// 纯文本转 LaTeX 的提示词
pub fn convert_prompt(plain_text: &str) -> Prompt {
    let user = format!("Convert this text to LaTeX format:\n\n{}", plain_text);
    Prompt::new(CONVERT_SYSTEM, user, REWRITE_TEMPERATURE)
}
