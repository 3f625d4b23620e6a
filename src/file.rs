use std::path::{Path, PathBuf};
use log::warn;
use walkdir::WalkDir;

/// 可轉換的 Word 系列副檔名（不分大小寫）。
pub const SUPPORTED_EXTENSIONS: &[&str] = &["doc", "docx", "docm", "dotx", "dotm", "odt", "rtf"];

pub fn is_supported_extension(ext: &str) -> bool {
    SUPPORTED_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext))
}

/// 一個待轉換的候選文件及其勾選狀態。
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// 相對於輸入目錄的顯示路徑。
    pub display_path: String,
    pub path: PathBuf,
    pub included: bool,
}

/// 遞迴掃描輸入目錄，回傳所有可轉換的文件，預設全部勾選。
///
/// 為了跨平台結果一致，依檔名排序走訪。目錄不存在或路徑為空時
/// 回傳空清單，不視為錯誤。
pub fn collect_entries(input_dir: &str) -> Vec<FileEntry> {
    let root = Path::new(input_dir);
    if input_dir.is_empty() || !root.is_dir() {
        return Vec::new();
    }

    let mut entries = Vec::new();
    for dir_entry in WalkDir::new(root).sort_by_file_name() {
        let dir_entry = match dir_entry {
            Ok(e) => e,
            Err(e) => {
                warn!("掃描目錄時略過無法讀取的項目：{}", e);
                continue;
            }
        };
        if !dir_entry.file_type().is_file() {
            continue;
        }
        let path = dir_entry.path();
        let supported = path
            .extension()
            .and_then(|e| e.to_str())
            .map(is_supported_extension)
            .unwrap_or(false);
        if !supported {
            continue;
        }
        let display_path = pathdiff::diff_paths(path, root)
            .unwrap_or_else(|| path.to_path_buf())
            .to_string_lossy()
            .into_owned();
        entries.push(FileEntry {
            display_path,
            path: path.to_path_buf(),
            included: true,
        });
    }
    entries
}

/// 全選／全不選。
pub fn set_all(entries: &mut [FileEntry], included: bool) {
    for entry in entries {
        entry.included = included;
    }
}

pub fn toggle(entry: &mut FileEntry) {
    entry.included = !entry.included;
}

/// 依勾選的索引集合重設所有項目的勾選狀態。
pub fn apply_selection(entries: &mut [FileEntry], selected: &[usize]) {
    set_all(entries, false);
    for &index in selected {
        if let Some(entry) = entries.get_mut(index) {
            entry.included = true;
        }
    }
}
