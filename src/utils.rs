use std::io;
use std::path::Path;
use indicatif::{ProgressBar, ProgressStyle};

pub fn setup_logging(log_level: &str) -> io::Result<()> {
    let log_level_filter = match log_level {
        "info" => log::LevelFilter::Info,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        _ => log::LevelFilter::Info,
    };
    env_logger::Builder::new()
        .filter_level(log_level_filter)
        .init();
    Ok(())
}

pub struct ProgressManager {
    pb: ProgressBar,
    no_progress: bool,
}

impl ProgressManager {
    pub fn new(total: u64, no_progress: bool) -> Self {
        let pb = if no_progress {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{msg} [{bar:40}] {pos}/{len} ETA: {eta_precise}")
                    .unwrap()
                    .progress_chars("##-"),
            );
            pb
        };
        ProgressManager { pb, no_progress }
    }

    pub fn update(&self, count: u64, msg: &str) {
        if self.no_progress {
            return;
        }
        self.pb.set_message(msg.to_string());
        self.pb.set_position(count);
    }

    /// 收尾並清掉進度列，讓下一次執行從零開始。
    pub fn finish(&self) {
        if self.no_progress {
            return;
        }
        self.pb.finish_and_clear();
    }
}

pub fn create_progress_bar(total: u64, no_progress: bool) -> ProgressManager {
    ProgressManager::new(total, no_progress)
}

/// 在平台預設的檔案瀏覽器中開啟目錄，發射後不管。
pub fn open_file_browser(dir: &Path) -> io::Result<()> {
    #[cfg(target_os = "windows")]
    let command = "explorer";
    #[cfg(target_os = "macos")]
    let command = "open";
    #[cfg(all(unix, not(target_os = "macos")))]
    let command = "xdg-open";

    std::process::Command::new(command).arg(dir).spawn()?;
    Ok(())
}
