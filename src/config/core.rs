//! # 配置管理模块 - 文件读写
//!
//! 按扩展名选择格式：`.toml` 使用 TOML，其余使用 JSON

use crate::error::SchemaResult;
use crate::types::DatabaseConfig;
use rat_logger::info;
use std::path::Path;

fn is_toml(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("toml")
}

impl DatabaseConfig {
    /// 从文件加载配置
    ///
    /// # 参数
    ///
    /// * `config_path` - 配置文件路径
    pub fn from_file<P: AsRef<Path>>(config_path: P) -> SchemaResult<Self> {
        let path = config_path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let config: DatabaseConfig = if is_toml(path) {
            toml::from_str(&content)
                .map_err(|e| crate::schema_error!(config, format!("解析TOML配置文件失败: {}", e)))?
        } else {
            serde_json::from_str(&content)
                .map_err(|e| crate::schema_error!(config, format!("解析JSON配置文件失败: {}", e)))?
        };

        info!("从文件加载配置: {:?}, 后端={}", path, config.backend_type());
        Ok(config)
    }

    /// 保存配置到文件
    ///
    /// # 参数
    ///
    /// * `config_path` - 配置文件路径
    pub fn save_to_file<P: AsRef<Path>>(&self, config_path: P) -> SchemaResult<()> {
        let path = config_path.as_ref();
        let content = if is_toml(path) {
            toml::to_string_pretty(self)
                .map_err(|e| crate::schema_error!(config, format!("序列化TOML配置失败: {}", e)))?
        } else {
            serde_json::to_string_pretty(self)
                .map_err(|e| crate::schema_error!(config, format!("序列化JSON配置失败: {}", e)))?
        };

        std::fs::write(path, content)?;

        info!("保存配置到文件: {:?}", path);
        Ok(())
    }
}
