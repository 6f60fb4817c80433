//! 代码块提取服务 - 业务能力层
//!
//! 从模型回答里取出第一个 Markdown 代码块

use regex::Regex;
use tracing::{debug, warn};

/// 回退判断：前两行以这些前缀开头时，整段回答都当成代码
const CODE_LINE_PREFIXES: [&str; 5] = ["import ", "def ", "class ", "from ", "#"];

/// 提取第一个 ```` ``` ```` 代码块（语言标记可选，仅识别 python）
///
/// 没有代码块时，如果前两行像 Python 代码就返回整段文本；否则返回 None
pub fn extract_code_block(text: &str) -> Option<String> {
    let re = match Regex::new(r"(?is)```(?:python)?\s*\n(.*?)\n```") {
        Ok(re) => re,
        Err(e) => {
            warn!("代码块正则编译失败: {}", e);
            return None;
        }
    };

    if let Some(code) = re.captures(text).and_then(|cap| cap.get(1)) {
        let code = code.as_str().trim();
        debug!("提取到代码块: {} 行", code.lines().count());
        return Some(code.to_string());
    }

    let trimmed = text.trim();
    let looks_like_code = trimmed
        .lines()
        .take(2)
        .any(|line| CODE_LINE_PREFIXES.iter().any(|p| line.trim().starts_with(p)));

    if looks_like_code {
        warn!("⚠️ 没有找到代码块，按 Python 关键字回退为整段文本");
        Some(trimmed.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fenced_python_block() {
        let text = "Here you go:\n```python\ndef add(a, b):\n    return a + b\n```\nDone.";
        assert_eq!(
            extract_code_block(text).as_deref(),
            Some("def add(a, b):\n    return a + b")
        );
    }

    #[test]
    fn test_fence_without_language_and_uppercase_tag() {
        assert_eq!(extract_code_block("```\nx = 1\n```").as_deref(), Some("x = 1"));
        assert_eq!(extract_code_block("```Python\ny = 2\n```").as_deref(), Some("y = 2"));
    }

    #[test]
    fn test_first_block_wins() {
        let text = "```python\nfirst()\n```\n\n```python\nsecond()\n```";
        assert_eq!(extract_code_block(text).as_deref(), Some("first()"));
    }

    #[test]
    fn test_fallback_on_python_keywords() {
        let text = "import os\nprint(os.getcwd())";
        assert_eq!(extract_code_block(text).as_deref(), Some(text));

        let second_line = "Answer:\ndef f(): pass";
        assert_eq!(extract_code_block(second_line).as_deref(), Some(second_line));
    }

    #[test]
    fn test_plain_prose_is_none() {
        assert_eq!(extract_code_block("The answer is 42."), None);
    }
}
