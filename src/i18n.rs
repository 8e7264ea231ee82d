/// User-facing texts for notifications and the summary.
/// Locale can be selected via the `--locale` CLI flag (e.g. `--locale zh`) or the config file.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Zh,
}

impl Locale {
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "zh" | "zh-cn" | "zh_cn" | "zh-hans" | "zh-tw" | "zh_tw" => Self::Zh,
            _ => Self::En,
        }
    }
}

pub struct Messages {
    pub invalid_magnet: &'static str,
    pub already_exists: &'static str,
    pub in_flight: &'static str,
    pub submit_failed: &'static str,
    pub no_matching_files: &'static str,
    pub select_failed: &'static str,
    pub added_and_selected: &'static str,
    pub no_links: &'static str,
    pub summary_header: &'static str,
    pub state_idle: &'static str,
    pub state_neutral: &'static str,
    pub state_active: &'static str,
    pub known: &'static str,
    pub new: &'static str,
}

pub static EN: Messages = Messages {
    invalid_magnet: "Invalid magnet link.",
    already_exists: "Torrent already exists in Real-Debrid.",
    in_flight: "This torrent is already being sent.",
    submit_failed: "Failed to send magnet link to Real-Debrid.",
    no_matching_files: "No files matched the selected extensions.",
    select_failed: "Magnet added, but selecting files in Real-Debrid failed.",
    added_and_selected: "Magnet link added and files selected in Real-Debrid!",
    no_links: "No magnet links found on the page.",
    summary_header: "Summary",
    state_idle: "idle",
    state_neutral: "already present",
    state_active: "sent",
    known: "known",
    new: "new",
};

pub static ZH: Messages = Messages {
    invalid_magnet: "无效的磁力链接。",
    already_exists: "该种子已存在于 Real-Debrid。",
    in_flight: "该种子正在发送中。",
    submit_failed: "发送磁力链接到 Real-Debrid 失败。",
    no_matching_files: "没有文件匹配所选扩展名。",
    select_failed: "磁力链接已添加，但在 Real-Debrid 中选择文件失败。",
    added_and_selected: "磁力链接已添加，并已在 Real-Debrid 中选择文件！",
    no_links: "页面上没有找到磁力链接。",
    summary_header: "摘要",
    state_idle: "未发送",
    state_neutral: "已存在",
    state_active: "已发送",
    known: "已有",
    new: "新",
};

pub fn get_messages(locale: Locale) -> &'static Messages {
    match locale {
        Locale::En => &EN,
        Locale::Zh => &ZH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locale_aliases() {
        assert_eq!(Locale::parse("zh-CN"), Locale::Zh);
        assert_eq!(Locale::parse("zh_tw"), Locale::Zh);
        assert_eq!(Locale::parse("fr"), Locale::En);
        assert_eq!(get_messages(Locale::Zh).summary_header, "摘要");
    }
}
