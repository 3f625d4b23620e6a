use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use log::{error, info, warn};

use crate::file::FileEntry;
use crate::soffice::DocumentConverter;
use crate::utils::create_progress_bar;

/// 一次使用者啟動的轉換批次：來源與輸出根目錄，加上掃描到的文件清單。
#[derive(Debug)]
pub struct ConversionJob {
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    pub entries: Vec<FileEntry>,
}

impl ConversionJob {
    /// 建立批次，要求每個文件都位於輸入根目錄之下。
    pub fn new(
        input_root: PathBuf,
        output_root: PathBuf,
        entries: Vec<FileEntry>,
    ) -> io::Result<Self> {
        for entry in &entries {
            if !entry.path.starts_with(&input_root) {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!(
                        "檔案 {} 不在輸入目錄 {} 之下",
                        entry.path.display(),
                        input_root.display()
                    ),
                ));
            }
        }
        Ok(ConversionJob {
            input_root,
            output_root,
            entries,
        })
    }
}

/// 單一檔案的失敗紀錄。
#[derive(Debug)]
pub struct FailedFile {
    pub file_name: String,
    pub reason: String,
}

/// 一次執行的彙總結果，顯示後即丟棄。
#[derive(Debug, Default)]
pub struct ConversionResult {
    pub succeeded: usize,
    pub failed: Vec<FailedFile>,
}

/// 計算鏡像輸出路徑：保留相對目錄結構，把副檔名換成 `.pdf`。
///
/// `path` 不在 `input_root` 之下屬於呼叫端違反約定，回傳 `InvalidInput`。
pub fn map_output_path(
    input_root: &Path,
    output_root: &Path,
    path: &Path,
) -> io::Result<PathBuf> {
    let relative = path.strip_prefix(input_root).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "檔案 {} 不在輸入目錄 {} 之下",
                path.display(),
                input_root.display()
            ),
        )
    })?;
    let mut output = output_root.join(relative);
    output.set_extension("pdf");
    Ok(output)
}

/// 進度百分比：處理完第 `idx` 個（共 `total` 個）後的進度值。
pub fn progress_percent(idx: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((idx as f64 / total as f64) * 100.0).round() as u32
}

fn convert_one(
    job: &ConversionJob,
    entry: &FileEntry,
    converter: &mut dyn DocumentConverter,
) -> io::Result<()> {
    let pdf_path = map_output_path(&job.input_root, &job.output_root, &entry.path)?;
    if let Some(parent) = pdf_path.parent() {
        fs::create_dir_all(parent)?;
    }
    converter.convert(&entry.path, &pdf_path)
}

/// 依清單順序逐一轉換勾選的文件。
///
/// 前置條件（輸入與輸出目錄皆非空、至少勾選一個檔案）不滿足時在
/// 任何轉換發生前回傳 `InvalidInput`。單一檔案的失敗只記錄進結果，
/// 不中斷整個批次。`cancel` 在每個檔案之間檢查一次，已開始的轉換
/// 不會被打斷，順序保證不變。
pub fn execute_run(
    job: &ConversionJob,
    converter: &mut dyn DocumentConverter,
    cancel: &AtomicBool,
    no_progress: bool,
) -> io::Result<ConversionResult> {
    if job.input_root.as_os_str().is_empty() || job.output_root.as_os_str().is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "請先選擇輸入和輸出目錄！",
        ));
    }
    let selected: Vec<&FileEntry> = job.entries.iter().filter(|e| e.included).collect();
    if selected.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "請至少選擇一個要轉換的檔案！",
        ));
    }

    let total = selected.len();
    info!(
        "開始轉換，輸入目錄：{}，輸出目錄：{}，共 {} 個檔案",
        job.input_root.display(),
        job.output_root.display(),
        total
    );

    let pb = create_progress_bar(total as u64, no_progress);
    let mut result = ConversionResult::default();
    for (idx, entry) in selected.iter().enumerate() {
        if cancel.load(Ordering::Relaxed) {
            warn!("使用者取消，停止於 {}/{}", idx, total);
            break;
        }
        let file_name = entry
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| entry.display_path.clone());
        match convert_one(job, entry, converter) {
            Ok(()) => result.succeeded += 1,
            Err(e) => {
                error!("轉換失敗：{} -> {}", entry.path.display(), e);
                result.failed.push(FailedFile {
                    file_name: file_name.clone(),
                    reason: e.to_string(),
                });
            }
        }
        let done = idx + 1;
        pb.update(
            done as u64,
            &format!(
                "正在轉換 {}...（{}/{}，{}%）",
                file_name,
                done,
                total,
                progress_percent(done, total)
            ),
        );
    }
    // 執行結束後進度歸零
    pb.finish();

    info!(
        "轉換結束，成功 {} 個，失敗 {} 個",
        result.succeeded,
        result.failed.len()
    );
    Ok(result)
}

/// 組出給使用者看的結果摘要。
pub fn format_summary(result: &ConversionResult) -> String {
    let mut msg = format!(
        "轉換完成！成功 {} 個，失敗 {} 個",
        result.succeeded,
        result.failed.len()
    );
    if !result.failed.is_empty() {
        msg.push_str("\n失敗檔案：");
        for failed in &result.failed {
            msg.push_str(&format!("\n{}（{}）", failed.file_name, failed.reason));
        }
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::collect_entries;
    use std::fs;

    /// 依腳本回報成功或失敗的假轉換器，並記錄每次呼叫。
    struct FakeConverter {
        calls: Vec<(PathBuf, PathBuf)>,
        fail_on: Option<usize>,
    }

    impl FakeConverter {
        fn new() -> Self {
            FakeConverter {
                calls: Vec::new(),
                fail_on: None,
            }
        }

        fn failing_on(call_index: usize) -> Self {
            FakeConverter {
                calls: Vec::new(),
                fail_on: Some(call_index),
            }
        }
    }

    impl DocumentConverter for FakeConverter {
        fn convert(&mut self, src: &Path, dest: &Path) -> io::Result<()> {
            let index = self.calls.len();
            self.calls.push((src.to_path_buf(), dest.to_path_buf()));
            if self.fail_on == Some(index) {
                return Err(io::Error::new(io::ErrorKind::Other, "模擬失敗"));
            }
            fs::write(dest, b"%PDF-")?;
            Ok(())
        }
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"x").unwrap();
    }

    fn no_cancel() -> AtomicBool {
        AtomicBool::new(false)
    }

    #[test]
    fn maps_nested_path_and_swaps_extension() {
        let mapped = map_output_path(
            Path::new("/a"),
            Path::new("/b"),
            Path::new("/a/x/y/doc1.DOCX"),
        )
        .unwrap();
        assert_eq!(mapped, PathBuf::from("/b/x/y/doc1.pdf"));
    }

    #[test]
    fn rejects_path_outside_input_root() {
        let err = map_output_path(Path::new("/a"), Path::new("/b"), Path::new("/c/doc.docx"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn job_rejects_entry_outside_input_root() {
        let entry = FileEntry {
            display_path: "doc.docx".to_string(),
            path: PathBuf::from("/elsewhere/doc.docx"),
            included: true,
        };
        let err = ConversionJob::new(PathBuf::from("/a"), PathBuf::from("/b"), vec![entry])
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn progress_percent_is_rounded_ratio() {
        assert_eq!(progress_percent(0, 3), 0);
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 67);
        assert_eq!(progress_percent(3, 3), 100);
        assert_eq!(progress_percent(0, 0), 0);
    }

    #[test]
    fn run_creates_mirrored_directories_and_outputs() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        touch(&input.path().join("x/y/doc1.docx"));

        let entries = collect_entries(input.path().to_str().unwrap());
        let job = ConversionJob::new(
            input.path().to_path_buf(),
            output.path().to_path_buf(),
            entries,
        )
        .unwrap();
        let mut converter = FakeConverter::new();
        let result = execute_run(&job, &mut converter, &no_cancel(), true).unwrap();

        assert_eq!(result.succeeded, 1);
        assert!(result.failed.is_empty());
        assert!(output.path().join("x/y").is_dir());
        assert!(output.path().join("x/y/doc1.pdf").is_file());
    }

    #[test]
    fn empty_roots_are_a_precondition_error_with_no_conversion() {
        let job = ConversionJob::new(PathBuf::new(), PathBuf::from("/b"), Vec::new()).unwrap();
        let mut converter = FakeConverter::new();
        let err = execute_run(&job, &mut converter, &no_cancel(), true).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(converter.calls.is_empty());
    }

    #[test]
    fn empty_selection_is_a_precondition_error_with_no_conversion() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        touch(&input.path().join("a.doc"));
        let mut entries = collect_entries(input.path().to_str().unwrap());
        crate::file::set_all(&mut entries, false);

        let job = ConversionJob::new(
            input.path().to_path_buf(),
            output.path().to_path_buf(),
            entries,
        )
        .unwrap();
        let mut converter = FakeConverter::new();
        let err = execute_run(&job, &mut converter, &no_cancel(), true).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(converter.calls.is_empty());
    }

    #[test]
    fn middle_failure_is_recorded_and_run_continues() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        touch(&input.path().join("a.docx"));
        touch(&input.path().join("b.docx"));
        touch(&input.path().join("c.docx"));

        let entries = collect_entries(input.path().to_str().unwrap());
        let job = ConversionJob::new(
            input.path().to_path_buf(),
            output.path().to_path_buf(),
            entries,
        )
        .unwrap();
        let mut converter = FakeConverter::failing_on(1);
        let result = execute_run(&job, &mut converter, &no_cancel(), true).unwrap();

        assert_eq!(converter.calls.len(), 3);
        assert_eq!(result.succeeded, 2);
        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.failed[0].file_name, "b.docx");
        assert!(result.failed[0].reason.contains("模擬失敗"));
        assert!(output.path().join("a.pdf").is_file());
        assert!(output.path().join("c.pdf").is_file());
    }

    #[test]
    fn cancellation_stops_between_files() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        touch(&input.path().join("a.docx"));
        touch(&input.path().join("b.docx"));

        let entries = collect_entries(input.path().to_str().unwrap());
        let job = ConversionJob::new(
            input.path().to_path_buf(),
            output.path().to_path_buf(),
            entries,
        )
        .unwrap();
        let mut converter = FakeConverter::new();
        let cancel = AtomicBool::new(true);
        let result = execute_run(&job, &mut converter, &cancel, true).unwrap();

        assert!(converter.calls.is_empty());
        assert_eq!(result.succeeded, 0);
    }

    #[test]
    fn summary_lists_failed_files_with_reasons() {
        let result = ConversionResult {
            succeeded: 2,
            failed: vec![FailedFile {
                file_name: "b.docx".to_string(),
                reason: "模擬失敗".to_string(),
            }],
        };
        let summary = format_summary(&result);
        assert!(summary.contains("成功 2 個"));
        assert!(summary.contains("失敗 1 個"));
        assert!(summary.contains("b.docx"));
        assert!(summary.contains("模擬失敗"));
    }
}
