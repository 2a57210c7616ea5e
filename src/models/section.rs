use phf::phf_map;

/// 论文常见章节，声明顺序即在主文档中的排列顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CanonicalSection {
    Abstract = 0,
    Introduction,
    LiteratureReview,
    RelatedWork,
    Methodology,
    Method,
    Approach,
    Implementation,
    Results,
    Evaluation,
    Experiments,
    Analysis,
    Discussion,
    Conclusion,
    FutureWork,
    Acknowledgments,
}

static SECTIONS: phf::Map<&'static str, CanonicalSection> = phf_map! {
    "abstract" => CanonicalSection::Abstract,
    "introduction" => CanonicalSection::Introduction,
    "literature_review" => CanonicalSection::LiteratureReview,
    "related_work" => CanonicalSection::RelatedWork,
    "methodology" => CanonicalSection::Methodology,
    "method" => CanonicalSection::Method,
    "approach" => CanonicalSection::Approach,
    "implementation" => CanonicalSection::Implementation,
    "results" => CanonicalSection::Results,
    "evaluation" => CanonicalSection::Evaluation,
    "experiments" => CanonicalSection::Experiments,
    "analysis" => CanonicalSection::Analysis,
    "discussion" => CanonicalSection::Discussion,
    "conclusion" => CanonicalSection::Conclusion,
    "future_work" => CanonicalSection::FutureWork,
    "acknowledgments" => CanonicalSection::Acknowledgments,
};

impl CanonicalSection {
    /// 未识别名称的排序值，大于所有已知章节
    pub const UNRANKED: usize = 1000;

    /// 在参考序列中的位置
    pub fn rank(self) -> usize {
        self as usize
    }

    /// 根据片段名称查找章节（忽略大小写，`-` 视为 `_`）
    pub fn lookup(name: &str) -> Option<Self> {
        let key = name.to_lowercase().replace('-', "_");
        SECTIONS.get(key.as_str()).copied()
    }

    /// 片段名称的排序值
    pub fn sort_key(name: &str) -> usize {
        Self::lookup(name).map_or(Self::UNRANKED, Self::rank)
    }
}
