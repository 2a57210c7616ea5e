/// 发给生成服务的两段式提示词
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    /// 固定的角色 / 风格说明（system 消息）
    pub system: String,
    /// 嵌入用户输入的任务说明（user 消息）
    pub user: String,
    /// 采样温度
    pub temperature: f32,
}

impl Prompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>, temperature: f32) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            temperature,
        }
    }
}
