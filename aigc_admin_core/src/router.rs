//! 页面路由与标签选择
//!
//! 只做路径到页面的映射，不负责任何网络请求。唯一的守卫是会话：未登录时只显示登录页。

use crate::auth::AuthContext;

/// 界面路径前缀
pub const UI_PREFIX: &str = "/aigc/admin";

/// 默认落地页
pub const DEFAULT_PATH: &str = "/aigc/admin/mainpage";

pub const LOGIN_PATH: &str = "/aigc/admin/login";

/// 页面
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    MainPage,
    User,
    Subscription,
    System,
}

impl Screen {
    /// 主界面导航栏：(标题, 路径)
    pub const NAV: [(&'static str, &'static str); 4] = [
        ("首页", "/aigc/admin/mainpage"),
        ("用户", "/aigc/admin/user"),
        ("订阅", "/aigc/admin/subscription"),
        ("系统", "/aigc/admin/system"),
    ];

    pub fn title(self) -> &'static str {
        match self {
            Screen::Login => "AIGC Admin",
            Screen::MainPage => "首页",
            Screen::User => "用户",
            Screen::Subscription => "订阅",
            Screen::System => "系统",
        }
    }
}

/// 将路径解析为页面，未知路径返回 `None`
pub fn resolve(path: &str) -> Option<Screen> {
    let path = path.strip_prefix(UI_PREFIX).unwrap_or(path);
    match path {
        "/login" => Some(Screen::Login),
        "/mainpage" => Some(Screen::MainPage),
        "/user" => Some(Screen::User),
        "/subscription" => Some(Screen::Subscription),
        "/system" => Some(Screen::System),
        _ => None,
    }
}

/// 简单路由：当前路径加上导航历史
#[derive(Debug, Clone)]
pub struct Router {
    current: String,
    history: Vec<String>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        Self::at(DEFAULT_PATH)
    }

    pub fn at(path: &str) -> Self {
        Self {
            current: path.to_string(),
            history: vec![path.to_string()],
        }
    }

    pub fn current_path(&self) -> &str {
        &self.current
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// 跳转到新路径并记入历史
    pub fn navigate(&mut self, path: &str) {
        if self.current == path {
            return;
        }
        self.current = path.to_string();
        self.history.push(self.current.clone());
    }

    /// 当前应显示的页面
    ///
    /// 未登录时总是登录页；已登录时停留在登录路径则显示首页。
    pub fn screen(&self, auth: &AuthContext) -> Option<Screen> {
        if !auth.is_logged_in() {
            return Some(Screen::Login);
        }
        match resolve(&self.current) {
            Some(Screen::Login) => Some(Screen::MainPage),
            other => other,
        }
    }

    /// 会话变化时调整路径：登出跳到登录页，在登录页登录后跳到首页
    ///
    /// 返回是否发生了跳转；已在目标路径时不会重复跳转。
    pub fn on_session_change(&mut self, token: Option<&str>) -> bool {
        let on_login = resolve(&self.current) == Some(Screen::Login);
        match token {
            None if !on_login => {
                self.navigate(LOGIN_PATH);
                true
            }
            Some(_) if on_login => {
                self.navigate(DEFAULT_PATH);
                true
            }
            _ => false,
        }
    }
}

/// 订阅页的标签
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubscriptionTab {
    #[default]
    Plans,
}

/// 系统页的标签
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SystemTab {
    #[default]
    Wechat,
}

/// 标签
pub trait Tab: Copy + Default + PartialEq + 'static {
    const ALL: &'static [Self];

    fn label(self) -> &'static str;
}

impl Tab for SubscriptionTab {
    const ALL: &'static [Self] = &[SubscriptionTab::Plans];

    fn label(self) -> &'static str {
        match self {
            SubscriptionTab::Plans => "订阅方案",
        }
    }
}

impl Tab for SystemTab {
    const ALL: &'static [Self] = &[SystemTab::Wechat];

    fn label(self) -> &'static str {
        match self {
            SystemTab::Wechat => "微信设置",
        }
    }
}

/// 标签选择器，保存当前选中的标签
#[derive(Debug, Clone, Copy, Default)]
pub struct TabSelector<T: Tab> {
    current: T,
}

impl<T: Tab> TabSelector<T> {
    pub fn current(&self) -> T {
        self.current
    }

    pub fn select(&mut self, tab: T) {
        self.current = tab;
    }

    /// 按标题选择，未知标题返回 `false`
    pub fn select_label(&mut self, label: &str) -> bool {
        match T::ALL.iter().find(|tab| tab.label() == label) {
            Some(tab) => {
                self.current = *tab;
                true
            }
            None => false,
        }
    }
}
