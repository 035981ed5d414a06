//! Demo content: the article batch a freshly connected session starts with.
//!
//! Mirrors the sample WeChat workspace the app demos against. Fetching more
//! articles appends another copy of the batch under fresh ids, standing in
//! for a real platform pull.

use crate::article::{Article, Category};
use crate::store::{ArticleStore, MemoryStore, StoreError};
use chrono::NaiveDate;

struct ArticleSeed {
    title: &'static str,
    content: &'static str,
    author: &'static str,
    publish_date: (i32, u32, u32),
    url_slug: &'static str,
    category_id: Option<&'static str>,
    edited: Option<(i32, u32, u32)>,
    spell_checked: bool,
}

const ARTICLE_SEEDS: [ArticleSeed; 5] = [
    ArticleSeed {
        title: "如何提高微信公众号的阅读量：10个实用技巧",
        content: "<p>在当今数字化时代，微信公众号已成为企业和个人进行内容营销和品牌建设的重要平台。然而，随着越来越多的公众号涌现，如何提高阅读量成为运营者面临的主要挑战。本文将分享10个实用技巧，帮助你提高微信公众号的阅读量。</p><h2>1. 制定明确的内容定位</h2><p>明确的内容定位有助于吸引特定的目标受众。确定你的公众号要为读者提供什么价值，是分享专业知识、行业动态、生活技巧还是娱乐内容。内容定位越精准，越能吸引真正对你的内容感兴趣的读者。</p>",
        author: "市场营销团队",
        publish_date: (2023, 11, 15),
        url_slug: "example1",
        category_id: Some("marketing"),
        edited: None,
        spell_checked: false,
    },
    ArticleSeed {
        title: "Python入门：从零开始学习编程",
        content: "<p>Python是一种易于学习且功能强大的编程语言。它拥有高效的高级数据结构，能够简单有效地实现面向对象编程。Python优雅的语法和动态类型，再加上它的解释性质，使它成为许多领域和大多数平台上进行脚本编写和快速应用开发的理想语言。</p><h2>1. 安装Python</h2><p>首先，你需要在你的电脑上安装Python。访问Python官方网站（python.org），下载并安装最新版本的Python。安装过程通常很简单，只需按照安装向导的指示进行操作即可。</p>",
        author: "技术团队",
        publish_date: (2023, 10, 25),
        url_slug: "example2",
        category_id: Some("tech"),
        edited: Some((2023, 12, 1)),
        spell_checked: true,
    },
    ArticleSeed {
        title: "UI设计趋势：2023年必知的设计动向",
        content: "<p>随着技术的不断发展和用户需求的变化，UI设计也在不断演变。2023年，我们看到了一些令人兴奋的设计趋势，它们正在重塑我们对数字界面的体验和感知。本文将探讨今年最重要的UI设计趋势，以及它们如何影响你的设计工作。</p><h2>1. 暗色模式的普及</h2><p>暗色模式（Dark Mode）已不再是一个新概念，但它在2023年变得更加普及。越来越多的应用和网站默认提供暗色模式选项，不仅因为它可以减少屏幕亮度、节省电池寿命，还因为许多用户在低光环境下更喜欢这种视觉体验。</p>",
        author: "设计团队",
        publish_date: (2023, 9, 10),
        url_slug: "example3",
        category_id: Some("design"),
        edited: None,
        spell_checked: false,
    },
    ArticleSeed {
        title: "机器学习入门：概念、算法与应用",
        content: "<p>机器学习是人工智能的一个分支，它专注于开发能够从数据中学习并进行预测的算法。本文将介绍机器学习的基本概念、常用算法以及实际应用场景，帮助读者建立对这一领域的基本认识。</p><h2>1. 什么是机器学习？</h2><p>机器学习是一种让计算机系统能够通过经验自动改进的方法。它涉及开发能够访问数据并使用数据来学习的计算机程序。学习的过程始于观察或数据，如直接经验或指导，以便寻找数据中的模式并根据这些经验做出更好的决策。</p>",
        author: "技术团队",
        publish_date: (2023, 8, 5),
        url_slug: "example4",
        category_id: Some("tech"),
        edited: Some((2023, 9, 1)),
        spell_checked: true,
    },
    ArticleSeed {
        title: "品牌建设策略：如何打造一个成功的品牌",
        content: "<p>品牌是企业最宝贵的资产之一。一个强大的品牌可以为企业带来竞争优势、顾客忠诚度以及更高的利润。但是，打造一个成功的品牌需要深思熟虑的策略和持续的努力。本文将探讨品牌建设的关键策略，帮助你打造一个与众不同、令人难忘的品牌。</p><h2>1. 定义你的品牌定位</h2><p>品牌定位是指你的品牌在目标市场中相对于竞争对手的位置。它涉及到你的品牌承诺、价值主张以及你希望在顾客心中建立的形象。清晰的品牌定位有助于引导所有的营销活动，确保品牌信息的一致性。</p>",
        author: "市场营销团队",
        publish_date: (2023, 7, 20),
        url_slug: "example5",
        category_id: Some("marketing"),
        edited: None,
        spell_checked: false,
    },
];

fn date(parts: (i32, u32, u32)) -> NaiveDate {
    let (y, m, d) = parts;
    // seed dates are fixed constants, from_ymd_opt cannot fail on them
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn build_article(seed: &ArticleSeed, id: u64) -> Article {
    Article {
        id: id.to_string(),
        title: seed.title.to_string(),
        content: seed.content.to_string(),
        author: seed.author.to_string(),
        publish_date: date(seed.publish_date),
        url: format!("https://mp.weixin.qq.com/s/{}", seed.url_slug),
        category_id: seed.category_id.map(str::to_string),
        is_edited: seed.edited.is_some(),
        last_edited: seed.edited.map(date),
        spell_checked: seed.spell_checked,
        analysis: None,
    }
}

/// The demo article batch, ids numbered from `start`
pub fn demo_articles(start: u64) -> Vec<Article> {
    ARTICLE_SEEDS
        .iter()
        .enumerate()
        .map(|(offset, seed)| build_article(seed, start + offset as u64))
        .collect()
}

/// The demo categories in manuscript order, `uncategorized` last
pub fn demo_categories() -> Vec<Category> {
    let specs: [(&str, &str, &str, u32, &str); 4] = [
        (
            "tech",
            "技术",
            "技术相关的文章，包括编程、机器学习等",
            1,
            "#4299E1",
        ),
        ("marketing", "营销", "市场营销相关的文章", 2, "#48BB78"),
        ("design", "设计", "UI设计、用户体验设计相关的文章", 3, "#ED8936"),
        ("uncategorized", "未分类", "尚未分类的文章", 4, "#A0AEC0"),
    ];

    specs
        .into_iter()
        .map(|(id, name, description, order, color)| Category {
            id: id.to_string(),
            name: name.to_string(),
            description: Some(description.to_string()),
            order,
            color: Some(color.to_string()),
        })
        .collect()
}

/// A store pre-loaded with the demo workspace
pub fn demo_store() -> MemoryStore {
    MemoryStore::with_contents(demo_articles(1), demo_categories())
}

/// Pull another batch from the platform (mocked: the demo batch again,
/// appended under fresh ids). Returns the number of articles added.
pub fn fetch_batch(store: &mut dyn ArticleStore) -> Result<usize, StoreError> {
    let start = store
        .next_article_id()
        .parse::<u64>()
        .unwrap_or(1);
    let batch = demo_articles(start);
    let added = batch.len();
    for article in batch {
        store.add_article(article)?;
    }
    Ok(added)
}
