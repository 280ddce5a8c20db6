//! 帧解码器配置。
//!
//! # 教案定位（Why）
//! - 解码过程中有少量策略性选择（标识符槽位容量、帧号不连续后的期望值、首行帧号、异常是否写日志），
//!   集中在 [`DecoderConfig`] 中，既可由代码通过 builder 构造，也可从 TOML 文本加载。
//!
//! # 契约说明（What）
//! - 所有字段均有默认值，缺省的 TOML 键回落到默认值；
//! - [`DecoderConfig::validate`] 是唯一的合法性判定入口，builder 与 TOML 加载都经由它校验。
//!
//! # 示例
//! ```toml
//! ident_capacity = 255
//! sequence_policy = "keep_expecting"
//! first_row_index = 1
//! log_anomalies = true
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 标识符槽位容量上限（IDENT 长度前缀为单字节）。
pub const MAX_IDENT_CAPACITY: usize = 255;

/// 帧号不连续时，下一行的期望帧号如何推进。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequencePolicy {
    /// 以实际读到的帧号为准：下一期望值 = 实际帧号 + 1。
    #[default]
    Reset,
    /// 忽略实际帧号：下一期望值 = 原期望值 + 1。
    KeepExpecting,
}

/// 帧解码器配置。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecoderConfig {
    /// IDENT / UNITS 槽位的码元容量。
    pub ident_capacity: usize,
    /// 帧号不连续后的推进策略。
    pub sequence_policy: SequencePolicy,
    /// 首行期望帧号。
    pub first_row_index: u32,
    /// 是否以 `warn` 级别记录帧号异常。
    pub log_anomalies: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            ident_capacity: MAX_IDENT_CAPACITY,
            sequence_policy: SequencePolicy::Reset,
            first_row_index: 1,
            log_anomalies: true,
        }
    }
}

impl DecoderConfig {
    /// 创建 builder，初始值为默认配置。
    #[must_use]
    pub fn builder() -> DecoderConfigBuilder {
        DecoderConfigBuilder::default()
    }

    /// 从 TOML 文本加载并校验。
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// 校验字段取值。
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_IDENT_CAPACITY).contains(&self.ident_capacity) {
            return Err(ConfigError::IdentCapacity {
                capacity: self.ident_capacity,
            });
        }
        Ok(())
    }
}

/// [`DecoderConfig`] 的构造器。
#[derive(Clone, Debug, Default)]
pub struct DecoderConfigBuilder {
    config: DecoderConfig,
}

impl DecoderConfigBuilder {
    /// 设置 IDENT / UNITS 槽位容量。
    #[must_use]
    pub fn ident_capacity(mut self, capacity: usize) -> Self {
        self.config.ident_capacity = capacity;
        self
    }

    /// 设置帧号推进策略。
    #[must_use]
    pub fn sequence_policy(mut self, policy: SequencePolicy) -> Self {
        self.config.sequence_policy = policy;
        self
    }

    /// 设置首行期望帧号。
    #[must_use]
    pub fn first_row_index(mut self, index: u32) -> Self {
        self.config.first_row_index = index;
        self
    }

    /// 开关帧号异常日志。
    #[must_use]
    pub fn log_anomalies(mut self, enabled: bool) -> Self {
        self.config.log_anomalies = enabled;
        self
    }

    /// 校验并产出配置。
    pub fn build(self) -> Result<DecoderConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
