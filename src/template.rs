//! Text templates for generated artifacts
//!
//! Placeholders are written `$NAME`, where NAME is a run of upper-case
//! letters, digits and underscores. Each producer builds the exact map of
//! values it wants substituted; nothing is looked up by reflection.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Result, fs as fs_err};

/// Placeholder name to substituted value
pub type TemplateValues = BTreeMap<&'static str, String>;

/// Substitute every known `$NAME` placeholder of `template`
///
/// The longest identifier run after `$` is the placeholder name. Names
/// missing from `values` are left untouched, and substituted values are
/// not scanned again.
pub fn render(template: &str, values: &TemplateValues) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let ident_len = after
            .find(|c: char| !(c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_'))
            .unwrap_or(after.len());
        let ident = &after[..ident_len];

        match values.get(ident) {
            Some(value) if !ident.is_empty() => out.push_str(value),
            _ => {
                out.push('$');
                out.push_str(ident);
            }
        }
        rest = &after[ident_len..];
    }
    out.push_str(rest);
    out
}

/// Template text from `dir/name` when present, else the built-in default
pub fn load_or_default(dir: Option<&Path>, name: &str, default: &str) -> Result<String> {
    if let Some(path) = dir.map(|d| d.join(name)).filter(|p| p.is_file()) {
        tracing::debug!("Using template {}", path.display());
        return std::fs::read_to_string(&path).map_err(|e| fs_err::read_failed(&path, &e));
    }
    Ok(default.to_string())
}

/// Join lines with the requested terminator, terminating the last line too
pub fn with_line_endings(text: &str, eol: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 16);
    for line in text.lines() {
        out.push_str(line.trim_end_matches('\r'));
        out.push_str(eol);
    }
    out
}

pub const META_KERNEL_TEMPLATE_NAME: &str = "metakernel.tm";

pub const META_KERNEL_TEMPLATE: &str = r"KPL/MK

Meta-kernel file: $FILE_NAME
------------------------------------------------------------------------

   This meta-kernel lists the $PDS4_MISSION_NAME SPICE kernels providing
   coverage for the whole mission. All of the kernels listed below are
   archived in the $PDS4_MISSION_NAME SPICE PDS4 archive. The kernel
   paths are relative to the meta-kernel location.

   Produced by $AUTHOR on $CURRENT_DATE.


Data
------------------------------------------------------------------------

   \begindata

     PATH_VALUES       = ( '$KERNELPATH' )

     PATH_SYMBOLS      = ( 'KERNELS' )

     KERNELS_TO_LOAD   = (

$KERNELS_IN_METAKERNEL

                         )

   \begintext


End of MK file.
";

pub const KERNEL_LIST_TEMPLATE_NAME: &str = "kernel_list.txt";

pub const KERNEL_LIST_TEMPLATE: &str = "DATE = $CURRENTDATE
SPACECRAFT = $OBS
NAIFER = $AUTHOR
PHONE = $PHONE
EMAIL = $EMAIL
DATASETID = $DATASETID
VOLUMEID = $VOLID
RELEASE_ID = $RELID
RELEASE_DATE = $RELDATE
EOH
";

pub const BUNDLE_LABEL_TEMPLATE_NAME: &str = "bundle.xml";

pub const BUNDLE_LABEL_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Product_Bundle xmlns="http://pds.nasa.gov/pds4/pds/v1">
  <Identification_Area>
    <logical_identifier>$BUNDLE_LID</logical_identifier>
    <version_id>$BUNDLE_VID</version_id>
    <title>$MISSION_NAME SPICE Kernel Archive Bundle</title>
    <product_class>Product_Bundle</product_class>
    <Citation_Information>
      <author_list>$AUTHOR</author_list>
      <publication_year>$PUBLICATION_YEAR</publication_year>
      <description>SPICE kernel archive bundle, release $RELEASE.</description>
    </Citation_Information>
    <Modification_History>
      <Modification_Detail>
        <modification_date>$RELEASE_DATE</modification_date>
        <version_id>$BUNDLE_VID</version_id>
        <description>Release $RELEASE.</description>
      </Modification_Detail>
    </Modification_History>
  </Identification_Area>
  <Context_Area>
    <Time_Coordinates>
      <start_date_time>$START_TIME</start_date_time>
      <stop_date_time>$STOP_TIME</stop_date_time>
    </Time_Coordinates>
  </Context_Area>
  <Bundle>
    <bundle_type>Archive</bundle_type>
  </Bundle>
  <File_Area_Text>
    <File>
      <file_name>$README_FILE</file_name>
    </File>
    <Stream_Text>
      <offset unit="byte">0</offset>
      <parsing_standard_id>7-Bit ASCII Text</parsing_standard_id>
      <record_delimiter>$END_OF_LINE</record_delimiter>
    </Stream_Text>
  </File_Area_Text>
$BUNDLE_MEMBER_ENTRIES
</Product_Bundle>
"#;

pub const README_TEMPLATE_NAME: &str = "readme.txt";

pub const README_TEMPLATE: &str = "$SPICE_NAME SPICE Kernel Archive
$UNDERLINE

   This bundle holds the SPICE kernels of the $SPICE_NAME mission, with
   the meta-kernels that load them, the SPICE archive description
   document and a checksum table of every archived file.

   The kernels are in spice_kernels/, one directory per kernel type.
   Every product is described by a PDS4 label next to it.

   Produced by $AUTHOR.
";

pub const KERNEL_LABEL_TEMPLATE_NAME: &str = "spice_kernel.xml";

pub const KERNEL_LABEL_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Product_SPICE_Kernel xmlns="http://pds.nasa.gov/pds4/pds/v1">
  <Identification_Area>
    <logical_identifier>$PRODUCT_LID</logical_identifier>
    <version_id>$PRODUCT_VID</version_id>
    <title>$MISSION_NAME SPICE Kernel $FILE_NAME</title>
    <product_class>Product_SPICE_Kernel</product_class>
    <Modification_History>
      <Modification_Detail>
        <modification_date>$PRODUCT_CREATION_DATE</modification_date>
        <version_id>$PRODUCT_VID</version_id>
        <description>Initial release.</description>
      </Modification_Detail>
    </Modification_History>
  </Identification_Area>
  <Context_Area>
    <Time_Coordinates>
      <start_date_time>$START_TIME</start_date_time>
      <stop_date_time>$STOP_TIME</stop_date_time>
    </Time_Coordinates>
    <Investigation_Area>
      <name>$MISSION_NAME</name>
      <type>Mission</type>
      <Internal_Reference>
        <lid_reference>$PDS4_MISSION_LID</lid_reference>
        <reference_type>data_to_investigation</reference_type>
      </Internal_Reference>
    </Investigation_Area>
  </Context_Area>
  <File_Area_SPICE_Kernel>
    <File>
      <file_name>$FILE_NAME</file_name>
      <creation_date_time>$PRODUCT_CREATION_TIME</creation_date_time>
      <file_size unit="byte">$FILE_SIZE</file_size>
      <md5_checksum>$FILE_CHECKSUM</md5_checksum>
    </File>
    <SPICE_Kernel>
      <offset unit="byte">0</offset>
      <parsing_standard_id>SPICE</parsing_standard_id>
      <kernel_type>$KERNEL_TYPE_ID</kernel_type>
      <encoding_type>$FILE_FORMAT</encoding_type>
      <description>$SPICE_KERNEL_DESCRIPTION</description>
    </SPICE_Kernel>
  </File_Area_SPICE_Kernel>
</Product_SPICE_Kernel>
"#;

pub const META_KERNEL_LABEL_TEMPLATE_NAME: &str = "spice_kernel_mk.xml";

pub const META_KERNEL_LABEL_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Product_SPICE_Kernel xmlns="http://pds.nasa.gov/pds4/pds/v1">
  <Identification_Area>
    <logical_identifier>$PRODUCT_LID</logical_identifier>
    <version_id>$PRODUCT_VID</version_id>
    <title>$MISSION_NAME SPICE Meta-Kernel $FILE_NAME</title>
    <product_class>Product_SPICE_Kernel</product_class>
    <Modification_History>
      <Modification_Detail>
        <modification_date>$PRODUCT_CREATION_DATE</modification_date>
        <version_id>$PRODUCT_VID</version_id>
        <description>Meta-kernel version $PRODUCT_VID.</description>
      </Modification_Detail>
    </Modification_History>
  </Identification_Area>
  <Context_Area>
    <Time_Coordinates>
      <start_date_time>$START_TIME</start_date_time>
      <stop_date_time>$STOP_TIME</stop_date_time>
    </Time_Coordinates>
    <Investigation_Area>
      <name>$MISSION_NAME</name>
      <type>Mission</type>
      <Internal_Reference>
        <lid_reference>$PDS4_MISSION_LID</lid_reference>
        <reference_type>data_to_investigation</reference_type>
      </Internal_Reference>
    </Investigation_Area>
  </Context_Area>
  <Reference_List>
$KERNEL_INTERNAL_REFERENCES
  </Reference_List>
  <File_Area_SPICE_Kernel>
    <File>
      <file_name>$FILE_NAME</file_name>
      <creation_date_time>$PRODUCT_CREATION_TIME</creation_date_time>
      <file_size unit="byte">$FILE_SIZE</file_size>
      <md5_checksum>$FILE_CHECKSUM</md5_checksum>
    </File>
    <SPICE_Kernel>
      <offset unit="byte">0</offset>
      <parsing_standard_id>SPICE</parsing_standard_id>
      <kernel_type>MK</kernel_type>
      <encoding_type>Character</encoding_type>
      <description>$SPICE_KERNEL_DESCRIPTION</description>
    </SPICE_Kernel>
  </File_Area_SPICE_Kernel>
</Product_SPICE_Kernel>
"#;

pub const COLLECTION_LABEL_TEMPLATE_NAME: &str = "collection.xml";

pub const COLLECTION_LABEL_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Product_Collection xmlns="http://pds.nasa.gov/pds4/pds/v1">
  <Identification_Area>
    <logical_identifier>$COLLECTION_LID</logical_identifier>
    <version_id>$COLLECTION_VID</version_id>
    <title>$MISSION_NAME SPICE Kernel Archive $COLLECTION_TYPE Collection</title>
    <product_class>Product_Collection</product_class>
    <Modification_History>
      <Modification_Detail>
        <modification_date>$PRODUCT_CREATION_DATE</modification_date>
        <version_id>$COLLECTION_VID</version_id>
        <description>Collection version $COLLECTION_VID.</description>
      </Modification_Detail>
    </Modification_History>
  </Identification_Area>
  <Context_Area>
    <Time_Coordinates>
      <start_date_time>$START_TIME</start_date_time>
      <stop_date_time>$STOP_TIME</stop_date_time>
    </Time_Coordinates>
  </Context_Area>
  <Collection>
    <collection_type>$COLLECTION_TYPE</collection_type>
  </Collection>
  <File_Area_Inventory>
    <File>
      <file_name>$FILE_NAME</file_name>
      <creation_date_time>$PRODUCT_CREATION_TIME</creation_date_time>
      <file_size unit="byte">$FILE_SIZE</file_size>
      <md5_checksum>$FILE_CHECKSUM</md5_checksum>
    </File>
    <Inventory>
      <offset unit="byte">0</offset>
      <parsing_standard_id>PDS DSV 1</parsing_standard_id>
      <records>$N_RECORDS</records>
      <record_delimiter>Carriage-Return Line-Feed</record_delimiter>
      <field_delimiter>Comma</field_delimiter>
      <reference_type>inventory_has_member_product</reference_type>
    </Inventory>
  </File_Area_Inventory>
</Product_Collection>
"#;

pub const CHECKSUM_LABEL_TEMPLATE_NAME: &str = "checksum.xml";

pub const CHECKSUM_LABEL_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Product_Ancillary xmlns="http://pds.nasa.gov/pds4/pds/v1">
  <Identification_Area>
    <logical_identifier>$PRODUCT_LID</logical_identifier>
    <version_id>$PRODUCT_VID</version_id>
    <title>$MISSION_NAME SPICE Kernel Archive Checksum Table</title>
    <product_class>Product_Ancillary</product_class>
    <Modification_History>
      <Modification_Detail>
        <modification_date>$PRODUCT_CREATION_DATE</modification_date>
        <version_id>$PRODUCT_VID</version_id>
        <description>Checksum table version $PRODUCT_VID.</description>
      </Modification_Detail>
    </Modification_History>
  </Identification_Area>
  <Context_Area>
    <Time_Coordinates>
      <start_date_time>$START_TIME</start_date_time>
      <stop_date_time>$STOP_TIME</stop_date_time>
    </Time_Coordinates>
  </Context_Area>
  <File_Area_Checksum_Manifest>
    <File>
      <file_name>$FILE_NAME</file_name>
      <creation_date_time>$PRODUCT_CREATION_TIME</creation_date_time>
      <file_size unit="byte">$FILE_SIZE</file_size>
      <md5_checksum>$FILE_CHECKSUM</md5_checksum>
    </File>
    <Checksum_Manifest>
      <offset unit="byte">0</offset>
      <parsing_standard_id>MD5Deep 4.n</parsing_standard_id>
      <record_delimiter>$END_OF_LINE</record_delimiter>
    </Checksum_Manifest>
  </File_Area_Checksum_Manifest>
</Product_Ancillary>
"#;

pub const DOCUMENT_LABEL_TEMPLATE_NAME: &str = "document.xml";

pub const DOCUMENT_LABEL_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Product_Document xmlns="http://pds.nasa.gov/pds4/pds/v1">
  <Identification_Area>
    <logical_identifier>$PRODUCT_LID</logical_identifier>
    <version_id>$PRODUCT_VID</version_id>
    <title>$MISSION_NAME SPICE Kernel Archive Description Document</title>
    <product_class>Product_Document</product_class>
    <Modification_History>
      <Modification_Detail>
        <modification_date>$PRODUCT_CREATION_DATE</modification_date>
        <version_id>$PRODUCT_VID</version_id>
        <description>Document version $PRODUCT_VID.</description>
      </Modification_Detail>
    </Modification_History>
  </Identification_Area>
  <Context_Area>
    <Time_Coordinates>
      <start_date_time>$START_TIME</start_date_time>
      <stop_date_time>$STOP_TIME</stop_date_time>
    </Time_Coordinates>
  </Context_Area>
  <Document>
    <publication_date>$PRODUCT_CREATION_DATE</publication_date>
    <Document_Edition>
      <edition_name>HTML</edition_name>
      <language>English</language>
      <files>1</files>
      <Document_File>
        <file_name>$FILE_NAME</file_name>
        <creation_date_time>$PRODUCT_CREATION_TIME</creation_date_time>
        <file_size unit="byte">$FILE_SIZE</file_size>
        <md5_checksum>$FILE_CHECKSUM</md5_checksum>
        <document_standard_id>HTML 5.0</document_standard_id>
      </Document_File>
    </Document_Edition>
  </Document>
</Product_Document>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&'static str, &str)]) -> TemplateValues {
        pairs.iter().map(|(k, v)| (*k, (*v).to_string())).collect()
    }

    #[test]
    fn test_render_substitutes_known_placeholders() {
        let out = render(
            "Meta-kernel file: $FILE_NAME by $AUTHOR",
            &values(&[("FILE_NAME", "maven_v01.tm"), ("AUTHOR", "NAIF")]),
        );
        assert_eq!(out, "Meta-kernel file: maven_v01.tm by NAIF");
    }

    #[test]
    fn test_render_uses_longest_identifier() {
        let out = render(
            "$KERNELS_IN_METAKERNEL",
            &values(&[("KERNELS", "wrong"), ("KERNELS_IN_METAKERNEL", "right")]),
        );
        assert_eq!(out, "right");
    }

    #[test]
    fn test_render_leaves_unknown_placeholders() {
        let out = render("'$KERNELS/lsk/naif0012.tls' costs $5", &values(&[]));
        assert_eq!(out, "'$KERNELS/lsk/naif0012.tls' costs $5");
    }

    #[test]
    fn test_render_does_not_rescan_values() {
        let out = render(
            "$A",
            &values(&[("A", "$B"), ("B", "expanded")]),
        );
        assert_eq!(out, "$B");
    }

    #[test]
    fn test_render_trailing_dollar() {
        assert_eq!(render("cost$", &values(&[])), "cost$");
    }

    #[test]
    fn test_with_line_endings() {
        assert_eq!(with_line_endings("a\nb\r\n", "\r\n"), "a\r\nb\r\n");
        assert_eq!(with_line_endings("a\r\nb", "\n"), "a\nb\n");
    }

    #[test]
    fn test_load_or_default() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("metakernel.tm"), "custom").unwrap();
        assert_eq!(
            load_or_default(Some(temp.path()), "metakernel.tm", "builtin").unwrap(),
            "custom"
        );
        assert_eq!(
            load_or_default(Some(temp.path()), "bundle.xml", "builtin").unwrap(),
            "builtin"
        );
        assert_eq!(load_or_default(None, "x", "builtin").unwrap(), "builtin");
    }
}
