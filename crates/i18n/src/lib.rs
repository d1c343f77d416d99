use std::collections::BTreeMap;

use note_types::{NoteFilter, SortKey, UiLanguage};

#[derive(Debug, Clone)]
pub struct I18n {
    lang: UiLanguage,
    zh_cn: BTreeMap<&'static str, &'static str>,
    en_us: BTreeMap<&'static str, &'static str>,
}

impl I18n {
    pub fn new(lang: UiLanguage) -> Self {
        Self {
            lang,
            zh_cn: zh_cn_map(),
            en_us: en_us_map(),
        }
    }

    pub fn t<'a>(&'a self, key: &'a str) -> &'a str {
        match self.lang {
            UiLanguage::ZhCn => self
                .zh_cn
                .get(key)
                .copied()
                .or_else(|| self.en_us.get(key).copied())
                .unwrap_or(key),
            UiLanguage::EnUs => self
                .en_us
                .get(key)
                .copied()
                .or_else(|| self.zh_cn.get(key).copied())
                .unwrap_or(key),
        }
    }

    /// Like [`I18n::t`], substituting `{name}` placeholders.
    pub fn format(&self, key: &str, args: &[(&str, &str)]) -> String {
        args.iter()
            .fold(self.t(key).to_owned(), |text, (name, value)| {
                text.replace(&format!("{{{name}}}"), value)
            })
    }

    pub fn filter_label(&self, filter: NoteFilter) -> &str {
        self.t(match filter {
            NoteFilter::All => "filter.all",
            NoteFilter::Pinned => "filter.pinned",
            NoteFilter::Recent => "filter.recent",
        })
    }

    pub fn sort_label(&self, sort: SortKey) -> &str {
        self.t(match sort {
            SortKey::Newest => "sort.newest",
            SortKey::Oldest => "sort.oldest",
            SortKey::Title => "sort.title",
        })
    }
}

fn zh_cn_map() -> BTreeMap<&'static str, &'static str> {
    BTreeMap::from([
        ("app.title", "笔记"),
        ("note.untitled", "无标题"),
        ("list.empty", "还没有笔记，输入 new 新建一条。"),
        ("list.no_match", "没有符合当前搜索或筛选条件的笔记。"),
        ("list.summary", "共 {shown} / {total} 条笔记"),
        ("detail.empty", "选择一条笔记以查看内容。"),
        ("detail.pinned", "已置顶"),
        ("detail.updated", "更新于"),
        ("filter.label", "筛选"),
        ("filter.all", "全部笔记"),
        ("filter.pinned", "已置顶"),
        ("filter.recent", "最近编辑"),
        ("sort.label", "排序"),
        ("sort.newest", "最新优先"),
        ("sort.oldest", "最早优先"),
        ("sort.title", "按标题"),
        ("search.label", "搜索"),
        ("status.loading", "正在加载笔记…"),
        ("status.busy", "另一项操作仍在进行中。"),
        ("status.skipped", "没有可执行的操作。"),
        ("status.discarded", "响应已过期，已忽略。"),
        ("confirm.delete", "确定删除“{title}”吗？[y/N] "),
        ("confirm.cancelled", "已取消删除。"),
        ("error.prefix", "错误"),
        ("error.dismiss_hint", "输入 dismiss 清除。"),
        ("health.ok", "服务端：{status}"),
        ("health.down", "无法连接服务端"),
        ("command.invalid", "无法识别的命令，输入 help 查看用法。"),
        ("select.out_of_range", "列表中没有这个序号。"),
        ("open.not_found", "没有这个 id 的笔记。"),
    ])
}

fn en_us_map() -> BTreeMap<&'static str, &'static str> {
    BTreeMap::from([
        ("app.title", "Notes"),
        ("note.untitled", "Untitled"),
        ("list.empty", "No notes yet. Type `new` to create one."),
        (
            "list.no_match",
            "No notes match the current search or filter.",
        ),
        ("list.summary", "{shown} of {total} notes"),
        ("detail.empty", "Select a note to view it."),
        ("detail.pinned", "Pinned"),
        ("detail.updated", "Updated"),
        ("filter.label", "Filter"),
        ("filter.all", "All notes"),
        ("filter.pinned", "Pinned"),
        ("filter.recent", "Recently edited"),
        ("sort.label", "Sort"),
        ("sort.newest", "Newest first"),
        ("sort.oldest", "Oldest first"),
        ("sort.title", "Title"),
        ("search.label", "Search"),
        ("status.loading", "Loading notes..."),
        ("status.busy", "Another change is still in progress."),
        ("status.skipped", "Nothing to do."),
        ("status.discarded", "The response was out of date and was ignored."),
        ("confirm.delete", "Delete \"{title}\"? [y/N] "),
        ("confirm.cancelled", "Delete cancelled."),
        ("error.prefix", "Error"),
        ("error.dismiss_hint", "Type `dismiss` to clear."),
        ("health.ok", "Server: {status}"),
        ("health.down", "Server unreachable"),
        ("command.invalid", "Unrecognised command. Type `help` for usage."),
        ("select.out_of_range", "No note at that position."),
        ("open.not_found", "No note with that id."),
    ])
}
