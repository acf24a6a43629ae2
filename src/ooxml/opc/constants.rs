//! Constant values related to the Open Packaging Convention and the
//! WordprocessingML drawing vocabulary the post-processor reads.

/// Open XML relationship target modes
pub mod target_mode {
    /// External relationship target mode (e.g., hyperlinks to external URLs)
    pub const EXTERNAL: &str = "External";
}

/// Well-known part names of a WordprocessingML package
pub mod part_name {
    /// Main document part
    pub const DOCUMENT: &str = "word/document.xml";

    /// Header parts are `word/header1.xml`, `word/header2.xml`, ...
    pub const HEADER_PREFIX: &str = "word/header";

    /// Footer parts are `word/footer1.xml`, `word/footer2.xml`, ...
    pub const FOOTER_PREFIX: &str = "word/footer";

    pub const XML_SUFFIX: &str = ".xml";
}

/// Qualified element and attribute names of a drawing.
///
/// Templates use the conventional prefixes; matching is done on these
/// qualified names.
pub mod drawing {
    pub const DRAWING: &str = "w:drawing";
    pub const ANCHOR: &str = "wp:anchor";
    pub const INLINE: &str = "wp:inline";
    pub const EXTENT: &str = "wp:extent";

    pub const GRAPHIC: &str = "a:graphic";
    pub const GRAPHIC_DATA: &str = "a:graphicData";
    pub const PIC: &str = "pic:pic";
    pub const NV_PIC_PR: &str = "pic:nvPicPr";
    pub const C_NV_PR: &str = "pic:cNvPr";
    pub const BLIP_FILL: &str = "pic:blipFill";
    pub const BLIP: &str = "a:blip";
    pub const SP_PR: &str = "pic:spPr";
    pub const XFRM: &str = "a:xfrm";
    pub const EXT: &str = "a:ext";

    /// Blip attribute holding the relationship id
    pub const EMBED: &str = "r:embed";
    pub const DESCR: &str = "descr";
    pub const DYNAMIC: &str = "dynamic";
    pub const CONTAINS: &str = "contains";
    pub const QRCODE: &str = "qrcode";
    pub const CX: &str = "cx";
    pub const CY: &str = "cy";
}
