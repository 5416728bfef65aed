//! 统计表写出.

use std::fs::File;
use std::path::Path;

use csv::{Writer, WriterBuilder};

use crate::consts::names::STATS_HEADER;
use crate::error::SinkError;
use crate::process::SliceStats;

/// `estadisticas.csv` 写出器. 表头在创建时立即写入, 即使之后没有任何行.
pub struct StatsWriter {
    inner: Writer<File>,
    rows: usize,
}

impl StatsWriter {
    /// 创建 (或覆盖) `path` 并写入表头.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, SinkError> {
        let mut inner = WriterBuilder::new()
            .has_headers(false)
            .from_path(path.as_ref())?;
        inner.write_record(STATS_HEADER)?;
        Ok(Self { inner, rows: 0 })
    }

    /// 追加一行. 调用方保证按切片编号升序调用.
    pub fn append(&mut self, stats: &SliceStats) -> Result<(), SinkError> {
        self.inner.serialize(stats)?;
        self.rows += 1;
        Ok(())
    }

    /// 刷新缓冲区, 返回已写入的行数 (不含表头).
    pub fn finish(&mut self) -> Result<usize, SinkError> {
        self.inner.flush()?;
        Ok(self.rows)
    }
}
