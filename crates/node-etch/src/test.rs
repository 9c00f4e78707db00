//! Test utilities and fixtures for node-etch.
//!
//! Sample node sources and mock records shared by the unit tests, the
//! integration tests and downstream crates.
//!
//! # Example
//!
//! ```
//! use node_etch::test::{mock_field, mock_node};
//!
//! let mut node = mock_node("add_numbers", "AddNumbers");
//! node.inputs.push(mock_field("a", "int", None));
//! assert!(node.inputs[0].required);
//! ```

use crate::node::{FieldRecord, Location, NodeModule, NodeRecord, OutputRecord};

/// A single-file repository holding the `AddNumbers` node and its output.
/// The node class starts on line 26.
pub const ADD_NUMBERS_SOURCE: &str = r#"from invokeai.invocation_api import (
    BaseInvocation,
    BaseInvocationOutput,
    InputField,
    InvocationContext,
    OutputField,
    invocation,
    invocation_output,
)


@invocation_output("add_numbers_output")
class AddNumbersOutput(BaseInvocationOutput):
    """The sum of two numbers"""

    sum: int = OutputField(description="The sum")


@invocation(
    "add_numbers",
    title="AddNumbers",
    tags=["math", "add"],
    category="math",
    version="1.0.0",
)
class AddNumbersInvocation(BaseInvocation):
    """Adds two numbers.

    Both inputs are integers.
    """

    a: int = InputField()
    b: int = InputField(default=0, description="Second addend")

    def invoke(self, context: InvocationContext) -> AddNumbersOutput:
        return AddNumbersOutput(sum=self.a + self.b)
"#;

/// Output definitions only; `ScaledOutput` inherits `value`.
pub const MATH_OUTPUTS_SOURCE: &str = r#"
@invocation_output("value_output")
class ValueOutput(BaseInvocationOutput):
    value: float = OutputField(description="The value (inherited)")


@invocation_output("scaled_output")
class ScaledOutput(ValueOutput):
    factor: float = OutputField(description="Scale factor")
"#;

/// A node with richer types, a long description and helper functions
pub const IMAGE_NODES_SOURCE: &str = r#"
import numpy as np
from PIL import Image


def to_grayscale(image):
    """Convert an image to grayscale.

    Uses the luminance formula.
    """
    return image.convert("L")


@invocation(
    "image_blur_custom",
    title="Blur | Custom",
    tags=["image", "blur"],
    category="image",
    version="1.2.0",
)
class CustomBlurInvocation(BaseInvocation, WithMetadata, WithBoard):
    """Blurs an image with a custom kernel.

    The kernel radius is clamped
    to the image size.
    """

    image: ImageField = InputField(description="The image to blur")
    radius: float = InputField(default=2.0, ge=0, description="Blur radius")
    mode: Literal["gaussian", "box"] = InputField(default="gaussian")
    kernel: Optional[list[float]] = InputField(default=None)

    def invoke(self, context: InvocationContext) -> ImageOutput:
        image = context.images.get_pil(self.image.image_name)
        if self.mode == "box":
            blurred = image.filter(ImageFilter.BoxBlur(self.radius))
        else:
            blurred = image.filter(ImageFilter.GaussianBlur(self.radius))
        image_dto = context.images.save(image=blurred)
        return ImageOutput.build(image_dto)
"#;

/// Create a mock location for test records.
pub fn mock_location() -> Location {
    Location::new("nodes.py", 1)
}

/// Create a field; required when `default` is `None`.
pub fn mock_field(name: &str, type_label: &str, default: Option<&str>) -> FieldRecord {
    FieldRecord::new(name, type_label, default.map(String::from))
}

/// Create a node with a title and no fields.
pub fn mock_node(id: &str, title: &str) -> NodeRecord {
    let mut node = NodeRecord::new(id, format!("{}Invocation", title.replace(' ', "")));
    node.title = title.to_string();
    node.location = mock_location();
    node
}

/// Create the `AddNumbers` record as introspection would produce it.
pub fn mock_add_numbers() -> NodeRecord {
    let mut node = mock_node("add_numbers", "AddNumbers");
    node.category = Some("math".to_string());
    node.description = "Adds two numbers.".to_string();
    node.inputs = vec![
        mock_field("a", "int", None),
        mock_field("b", "int", Some("0")).with_description("Second addend"),
    ];
    node.output = Some(OutputRecord {
        type_name: "AddNumbersOutput".to_string(),
        fields: vec![mock_field("sum", "int", None).with_description("The sum")],
    });
    node
}

/// Create a module holding `nodes`.
pub fn mock_module(name: &str, nodes: Vec<NodeRecord>) -> NodeModule {
    NodeModule {
        name: name.to_string(),
        nodes,
        ..Default::default()
    }
}
