//! Typed view over a `<w:drawing>` element.
//!
//! A drawing placed in a paragraph run looks like this (trimmed):
//!
//! ```xml
//! <w:drawing>
//!   <wp:anchor ...>
//!     <wp:extent cx="4000" cy="3000"/>
//!     <a:graphic><a:graphicData>
//!       <pic:pic>
//!         <pic:nvPicPr>
//!           <pic:cNvPr id="1" name="x" descr="http://img/a.png" dynamic="true"/>
//!         </pic:nvPicPr>
//!         <pic:blipFill><a:blip r:embed="rId5"/></pic:blipFill>
//!         <pic:spPr><a:xfrm><a:ext cx="4000" cy="3000"/></a:xfrm></pic:spPr>
//!       </pic:pic>
//!     </a:graphicData></a:graphic>
//!   </wp:anchor>
//! </w:drawing>
//! ```
//!
//! [`Drawing`] wraps the `w:drawing` element and turns the element paths
//! above into accessors. The anchor is the first `wp:anchor` or `wp:inline`
//! child; a drawing whose anchor has been emptied is *detached* and no
//! longer takes part in substitution.
use crate::common::xml::{XmlElement, XmlNode};
use crate::ooxml::opc::constants::drawing as names;

/// Path from the anchor to the `pic:pic` element.
const PICTURE_PATH: [&str; 3] = [names::GRAPHIC, names::GRAPHIC_DATA, names::PIC];

/// Path from `pic:pic` to its non-visual properties.
const PROPS_PATH: [&str; 2] = [names::NV_PIC_PR, names::C_NV_PR];

/// Path from `pic:pic` to the blip carrying the relationship id.
const BLIP_PATH: [&str; 2] = [names::BLIP_FILL, names::BLIP];

/// Path from `pic:pic` to the shape extent.
const SHAPE_EXT_PATH: [&str; 3] = [names::SP_PR, names::XFRM, names::EXT];

/// Width and height of a box in EMUs (English Metric Units).
///
/// 914400 EMUs make one inch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Extent {
    pub cx: u64,
    pub cy: u64,
}

impl Extent {
    /// Create a new extent.
    #[inline]
    pub const fn new(cx: u64, cy: u64) -> Self {
        Self { cx, cy }
    }

    /// The zero box, used when an image has no usable dimensions.
    pub const ZERO: Extent = Extent::new(0, 0);

    /// Read `cx`/`cy` from an extent element.
    ///
    /// Returns `None` if either attribute is missing or not an unsigned integer.
    pub fn from_element(element: &XmlElement) -> Option<Self> {
        let cx = atoi_simd::parse::<u64, false, false>(element.attribute(names::CX)?.as_bytes()).ok()?;
        let cy = atoi_simd::parse::<u64, false, false>(element.attribute(names::CY)?.as_bytes()).ok()?;
        Some(Self { cx, cy })
    }

    /// Write `cx`/`cy` onto an extent element, keeping attribute order.
    pub fn write_to(&self, element: &mut XmlElement) {
        element.set_attribute(names::CX, &self.cx.to_string());
        element.set_attribute(names::CY, &self.cy.to_string());
    }
}

/// Substitution metadata carried by `pic:cNvPr`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PictureProps {
    /// Substitution payload (URL, path, data URI), empty when absent
    pub descr: String,
    /// `dynamic="true"`
    pub dynamic_flag: bool,
    /// `contains="true"`
    pub contained: bool,
    /// `qrcode` present and not `"false"`
    pub qr_section: bool,
}

impl PictureProps {
    /// Read the properties from a `pic:cNvPr` element.
    pub fn from_element(element: &XmlElement) -> Self {
        let qr = element.attribute(names::QRCODE).unwrap_or_default();
        Self {
            descr: element.attribute(names::DESCR).unwrap_or_default().to_string(),
            dynamic_flag: element.attribute(names::DYNAMIC) == Some("true"),
            contained: element.attribute(names::CONTAINS) == Some("true"),
            qr_section: !qr.is_empty() && qr != "false",
        }
    }

    /// A placeholder that carries a payload to substitute.
    #[inline]
    pub fn is_dynamic(&self) -> bool {
        self.dynamic_flag && !self.descr.is_empty()
    }

    /// A placeholder marked dynamic that received no payload.
    #[inline]
    pub fn is_unreplaced(&self) -> bool {
        self.dynamic_flag && self.descr.is_empty()
    }
}

/// Mutable view over one `w:drawing` element.
#[derive(Debug)]
pub struct Drawing<'a> {
    element: &'a mut XmlElement,
}

impl<'a> Drawing<'a> {
    /// Wrap a `w:drawing` element.
    pub fn new(element: &'a mut XmlElement) -> Self {
        Self { element }
    }

    /// The wrapped element.
    #[inline]
    pub fn element(&self) -> &XmlElement {
        self.element
    }

    fn is_anchor(element: &XmlElement) -> bool {
        element.name() == names::ANCHOR || element.name() == names::INLINE
    }

    /// The `wp:anchor` or `wp:inline` child, whichever comes first.
    pub fn anchor(&self) -> Option<&XmlElement> {
        self.element.child_elements().find(|e| Self::is_anchor(e))
    }

    fn anchor_mut(&mut self) -> Option<&mut XmlElement> {
        self.element
            .children_mut()
            .iter_mut()
            .find_map(|node| match node {
                XmlNode::Element(e) if Self::is_anchor(e) => Some(e),
                _ => None,
            })
    }

    /// Whether the anchor is missing or has been emptied.
    pub fn is_detached(&self) -> bool {
        self.anchor().is_none_or(XmlElement::is_empty)
    }

    /// Empty the anchor in place, leaving `<wp:anchor/>`.
    ///
    /// Returns `false` if the drawing was already detached.
    pub fn detach(&mut self) -> bool {
        match self.anchor_mut() {
            Some(anchor) if !anchor.is_empty() => {
                anchor.clear();
                true
            },
            _ => false,
        }
    }

    /// The `pic:pic` element under the anchor.
    pub fn picture(&self) -> Option<&XmlElement> {
        self.anchor()?.path(&PICTURE_PATH)
    }

    fn picture_mut(&mut self) -> Option<&mut XmlElement> {
        self.anchor_mut()?.path_mut(&PICTURE_PATH)
    }

    /// Substitution metadata of the picture.
    pub fn props(&self) -> Option<PictureProps> {
        self.picture()?
            .path(&PROPS_PATH)
            .map(PictureProps::from_element)
    }

    /// Relationship id referenced by the picture's blip.
    pub fn blip_id(&self) -> Option<&str> {
        self.picture()?.path(&BLIP_PATH)?.attribute(names::EMBED)
    }

    /// Point the blip at another relationship id.
    ///
    /// Returns `false` if the picture has no blip.
    pub fn set_blip_id(&mut self, r_id: &str) -> bool {
        match self.picture_mut().and_then(|pic| pic.path_mut(&BLIP_PATH)) {
            Some(blip) => {
                blip.set_attribute(names::EMBED, r_id);
                true
            },
            None => false,
        }
    }

    /// Extent declared on the anchor (`wp:extent`).
    pub fn anchor_extent(&self) -> Option<Extent> {
        self.anchor()?
            .child(names::EXTENT)
            .and_then(Extent::from_element)
    }

    /// Extent declared on the picture's shape properties.
    pub fn shape_extent(&self) -> Option<Extent> {
        self.picture()?
            .path(&SHAPE_EXT_PATH)
            .and_then(Extent::from_element)
    }

    /// The box an image must fit into: the shape extent, else the anchor extent.
    pub fn bounding_box(&self) -> Option<Extent> {
        self.shape_extent().or_else(|| self.anchor_extent())
    }

    /// Write `extent` to both the anchor extent and the shape extent.
    ///
    /// Only existing extent elements are updated. Returns how many were written.
    pub fn set_extent(&mut self, extent: Extent) -> usize {
        let mut written = 0;
        if let Some(anchor_ext) = self.anchor_mut().and_then(|a| a.child_mut(names::EXTENT)) {
            extent.write_to(anchor_ext);
            written += 1;
        }
        if let Some(shape_ext) = self.picture_mut().and_then(|p| p.path_mut(&SHAPE_EXT_PATH)) {
            extent.write_to(shape_ext);
            written += 1;
        }
        written
    }
}
